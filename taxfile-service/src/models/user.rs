//! User model for taxfile-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered tax filer. `user_id` is supplied by the caller at creation
/// time and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}
