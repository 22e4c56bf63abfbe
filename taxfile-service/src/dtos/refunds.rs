use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ErrorDetail, RefundWithFile};

/// Query keys for `GET /refund`: either `fileId`, or `userId` and `year`
/// together. The handler rejects requests that supply neither.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQueryParams {
    pub user_id: Option<String>,
    pub year: Option<i32>,
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub file_id: String,
    pub user_id: String,
    pub year: i32,
    pub refund_status: String,
    pub errors: Vec<ErrorDetail>,
    pub eta: DateTime<Utc>,
}

impl From<RefundWithFile> for RefundResponse {
    fn from(refund: RefundWithFile) -> Self {
        Self {
            file_id: refund.tax_file_id.to_string(),
            user_id: refund.user_id,
            year: refund.tax_year,
            refund_status: refund.refund_status,
            errors: ErrorDetail::from_stored(refund.refund_errors.as_ref()),
            eta: refund.refund_eta,
        }
    }
}
