//! Refund model for taxfile-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Processing status of a refund.
///
/// PENDING -> IN_PROGRESS -> {APPROVED, REJECTED, ERROR}. ERROR may follow
/// any state; nothing transitions back to PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
    Error,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "PENDING",
            RefundStatus::InProgress => "IN_PROGRESS",
            RefundStatus::Approved => "APPROVED",
            RefundStatus::Rejected => "REJECTED",
            RefundStatus::Error => "ERROR",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => RefundStatus::InProgress,
            "APPROVED" => RefundStatus::Approved,
            "REJECTED" => RefundStatus::Rejected,
            "ERROR" => RefundStatus::Error,
            _ => RefundStatus::Pending,
        }
    }
}

/// One entry of a refund error list, preserved in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    /// Deserialize a stored `refund_errors`/`error_reasons` JSONB column.
    /// Absent or unreadable values yield an empty list.
    pub fn from_stored(value: Option<&Value>) -> Vec<ErrorDetail> {
        match value {
            Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
                tracing::warn!("Unreadable stored error list: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }
}

/// A refund joined with the identifying fields of its owning tax file.
#[derive(Debug, Clone, FromRow)]
pub struct RefundWithFile {
    pub refund_id: Uuid,
    pub tax_file_id: Uuid,
    pub user_id: String,
    pub tax_year: i32,
    pub refund_status: String,
    pub refund_errors: Option<Value>,
    pub refund_eta: DateTime<Utc>,
}
