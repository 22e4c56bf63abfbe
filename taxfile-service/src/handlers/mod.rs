//! HTTP handlers for taxfile-service.

pub mod health;
pub mod refund_events;
pub mod refunds;
pub mod tax_files;
pub mod users;

pub use health::health_check;
pub use refund_events::process_refund_event;
pub use refunds::get_refund;
pub use tax_files::{create_tax_file, get_tax_file, get_tax_user};
pub use users::{create_user, get_user, list_users};
