//! Refund lifecycle events and the status transition table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::RefundStatus;

/// The four recognized refund lifecycle events, identified on the wire by
/// their dotted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundEventType {
    InProgress,
    Approved,
    Rejected,
    Error,
}

impl RefundEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundEventType::InProgress => "refund.inprogress",
            RefundEventType::Approved => "refund.approved",
            RefundEventType::Rejected => "refund.rejected",
            RefundEventType::Error => "refund.error",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "refund.inprogress" => Some(RefundEventType::InProgress),
            "refund.approved" => Some(RefundEventType::Approved),
            "refund.rejected" => Some(RefundEventType::Rejected),
            "refund.error" => Some(RefundEventType::Error),
            _ => None,
        }
    }

    /// Resolve the status transition for this event against the current
    /// refund status. `None` means the event is a no-op: an in-progress
    /// event on a refund that already advanced past PENDING is ignored.
    /// Approval, rejection and error events apply unconditionally.
    pub fn apply(&self, current: RefundStatus) -> Option<RefundStatus> {
        match self {
            RefundEventType::InProgress => {
                (current == RefundStatus::Pending).then_some(RefundStatus::InProgress)
            }
            RefundEventType::Approved => Some(RefundStatus::Approved),
            RefundEventType::Rejected => Some(RefundStatus::Rejected),
            RefundEventType::Error => Some(RefundStatus::Error),
        }
    }
}

/// Audit record input, appended for every processed event including those
/// whose status change was suppressed.
#[derive(Debug, Clone)]
pub struct NewRefundEvent {
    pub refund_id: Uuid,
    pub event_type: RefundEventType,
    pub event_date: DateTime<Utc>,
    pub error_reasons: Option<Value>,
}
