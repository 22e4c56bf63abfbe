//! Infrastructure services: persistence, cache, notifications, ETA.

pub mod cache;
pub mod database;
pub mod eta;
pub mod pubsub;

pub use cache::{MemoryCache, NoOpCache, RedisCache, TaxFileCache};
pub use database::Database;
pub use eta::predict_eta;
pub use pubsub::{MemoryPublisher, NoOpPublisher, RedisPublisher, RefundPublisher};
