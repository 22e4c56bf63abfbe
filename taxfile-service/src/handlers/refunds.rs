use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;

use crate::dtos::{RefundQueryParams, RefundResponse};
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state))]
pub async fn get_refund(
    State(state): State<AppState>,
    Query(params): Query<RefundQueryParams>,
) -> Result<Json<RefundResponse>, AppError> {
    let refund = if let Some(file_id) = params.file_id {
        let file_id = Uuid::parse_str(&file_id)
            .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid file ID: {}", file_id)))?;
        state
            .db
            .get_refund_by_file_id(file_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Refund not found for file ID: {}", file_id))
            })?
    } else if let (Some(user_id), Some(year)) = (params.user_id, params.year) {
        state
            .db
            .get_refund_by_user_year(&user_id, year)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Refund not found for user {} and year {}",
                    user_id,
                    year
                ))
            })?
    } else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Either fileId or both userId and year must be provided"
        )));
    };

    Ok(Json(refund.into()))
}
