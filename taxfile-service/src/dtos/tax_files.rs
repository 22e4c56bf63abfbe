use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ErrorDetail, TaxFileWithRefund};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaxFileRequest {
    #[validate(length(min = 1, max = 100, message = "User ID must be between 1 and 100 characters"))]
    pub user_id: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tax_rate: Decimal,
    pub deducted: Decimal,
    pub refund: Decimal,
}

impl CreateTaxFileRequest {
    /// Decimal constraints the derive cannot express: amounts are
    /// non-negative and the tax rate is a percentage.
    pub fn check_amounts(&self) -> Result<(), String> {
        for (name, value) in [
            ("income", self.income),
            ("expense", self.expense),
            ("taxRate", self.tax_rate),
            ("deducted", self.deducted),
            ("refund", self.refund),
        ] {
            if value < Decimal::ZERO {
                return Err(format!("{} must be non-negative", name));
            }
        }
        if self.tax_rate > Decimal::from(100) {
            return Err("taxRate must not exceed 100".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxFileResponse {
    pub file_id: String,
    pub user_id: String,
    pub year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tax_rate: Decimal,
    pub deducted: Decimal,
    pub refund: Decimal,
    pub tax_status: String,
    pub refund_status: Option<String>,
    pub refund_errors: Vec<ErrorDetail>,
    pub refund_eta: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaxFileWithRefund> for TaxFileResponse {
    fn from(tax_file: TaxFileWithRefund) -> Self {
        Self {
            file_id: tax_file.file_id.to_string(),
            user_id: tax_file.user_id,
            year: tax_file.tax_year,
            income: tax_file.income,
            expense: tax_file.expense,
            tax_rate: tax_file.tax_rate,
            deducted: tax_file.deducted,
            refund: tax_file.refund_amount,
            tax_status: tax_file.tax_status,
            refund_status: tax_file.refund_status,
            refund_errors: ErrorDetail::from_stored(tax_file.refund_errors.as_ref()),
            refund_eta: tax_file.refund_eta,
            created_at: tax_file.created_utc,
            updated_at: tax_file.updated_utc,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTaxFileParams {
    pub user_id: String,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxUserParams {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxUserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub tax_files: Vec<TaxFileSummary>,
    pub total_files: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxFileSummary {
    pub file_id: String,
    pub year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tax_rate: Decimal,
    pub deducted: Decimal,
    pub refund_amount: Decimal,
    pub tax_status: String,
    pub refund_status: Option<String>,
    pub refund_eta: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaxFileWithRefund> for TaxFileSummary {
    fn from(tax_file: TaxFileWithRefund) -> Self {
        Self {
            file_id: tax_file.file_id.to_string(),
            year: tax_file.tax_year,
            income: tax_file.income,
            expense: tax_file.expense,
            tax_rate: tax_file.tax_rate,
            deducted: tax_file.deducted,
            refund_amount: tax_file.refund_amount,
            tax_status: tax_file.tax_status,
            refund_status: tax_file.refund_status,
            refund_eta: tax_file.refund_eta,
            created_at: tax_file.created_utc,
            updated_at: tax_file.updated_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tax_rate: &str, refund: &str) -> CreateTaxFileRequest {
        CreateTaxFileRequest {
            user_id: "u1".to_string(),
            year: 2024,
            income: Decimal::new(12_000_000, 2),
            expense: Decimal::new(2_000_000, 2),
            tax_rate: tax_rate.parse().unwrap(),
            deducted: Decimal::new(2_500_000, 2),
            refund: refund.parse().unwrap(),
        }
    }

    #[test]
    fn accepts_in_range_amounts() {
        assert!(request("30", "500").check_amounts().is_ok());
        assert!(request("0", "0").check_amounts().is_ok());
        assert!(request("100", "0.01").check_amounts().is_ok());
    }

    #[test]
    fn rejects_negative_amounts_and_oversized_rate() {
        assert!(request("30", "-1").check_amounts().is_err());
        assert!(request("100.01", "500").check_amounts().is_err());
    }
}
