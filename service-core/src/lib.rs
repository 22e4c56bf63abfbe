//! service-core: Shared infrastructure for the tax filing services.
pub mod error;
pub mod observability;
