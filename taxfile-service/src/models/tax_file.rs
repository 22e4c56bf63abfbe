//! Tax file model for taxfile-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Filing status of a tax file. PENDING while a refund is outstanding,
/// COMPLETED otherwise. Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxStatus {
    Pending,
    Completed,
}

impl TaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxStatus::Pending => "PENDING",
            TaxStatus::Completed => "COMPLETED",
        }
    }

    /// PENDING iff a refund is owed.
    pub fn for_refund_amount(refund_amount: Decimal) -> Self {
        if refund_amount > Decimal::ZERO {
            TaxStatus::Pending
        } else {
            TaxStatus::Completed
        }
    }
}

/// Input for creating a tax file.
#[derive(Debug, Clone)]
pub struct CreateTaxFile {
    pub user_id: String,
    pub tax_year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tax_rate: Decimal,
    pub deducted: Decimal,
    pub refund_amount: Decimal,
    pub tax_status: TaxStatus,
}

/// A tax file joined with its refund, when one exists.
#[derive(Debug, Clone, FromRow)]
pub struct TaxFileWithRefund {
    pub file_id: Uuid,
    pub user_id: String,
    pub tax_year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tax_rate: Decimal,
    pub deducted: Decimal,
    pub refund_amount: Decimal,
    pub tax_status: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    pub refund_status: Option<String>,
    pub refund_errors: Option<Value>,
    pub refund_eta: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_pending_only_for_positive_refund() {
        assert_eq!(
            TaxStatus::for_refund_amount(Decimal::new(50000, 2)),
            TaxStatus::Pending
        );
        assert_eq!(
            TaxStatus::for_refund_amount(Decimal::ZERO),
            TaxStatus::Completed
        );
    }
}
