use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use validator::Validate;

use crate::dtos::{
    CreateTaxFileRequest, GetTaxFileParams, TaxFileResponse, TaxUserParams, TaxUserResponse,
};
use crate::models::{CreateTaxFile, TaxStatus};
use crate::services::predict_eta;
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, request), fields(user_id = %request.user_id, year = request.year))]
pub async fn create_tax_file(
    State(state): State<AppState>,
    Json(request): Json<CreateTaxFileRequest>,
) -> Result<(StatusCode, Json<TaxFileResponse>), AppError> {
    request.validate()?;
    request
        .check_amounts()
        .map_err(|reason| AppError::BadRequest(anyhow::anyhow!(reason)))?;

    let tax_status = TaxStatus::for_refund_amount(request.refund);
    let refund_eta = (request.refund > Decimal::ZERO).then(predict_eta);

    let file_id = state
        .db
        .create_tax_file(
            &CreateTaxFile {
                user_id: request.user_id.clone(),
                tax_year: request.year,
                income: request.income,
                expense: request.expense,
                tax_rate: request.tax_rate,
                deducted: request.deducted,
                refund_amount: request.refund,
                tax_status,
            },
            refund_eta,
        )
        .await?;

    // Re-read the complete file so the response carries the refund row.
    let tax_file = state
        .db
        .get_tax_file_with_refund(&request.user_id, request.year)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Failed to retrieve created tax file"))
        })?;
    let response = TaxFileResponse::from(tax_file);

    if let Some(eta) = refund_eta {
        // Shape matches the downstream refund processor's expectations.
        let payload = json!({
            "file_id": file_id,
            "status": "pending",
            "error_message": null,
            "refund_amount": request.refund.to_string(),
            "user_id": request.user_id,
            "year": request.year,
            "eta": eta,
            "timestamp": Utc::now(),
        })
        .to_string();
        state.publisher.publish_send_refund(&payload).await;
    }

    state
        .cache
        .put(&request.user_id, request.year, &response)
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state))]
pub async fn get_tax_file(
    State(state): State<AppState>,
    Query(params): Query<GetTaxFileParams>,
) -> Result<Json<TaxFileResponse>, AppError> {
    if let Some(cached) = state.cache.get(&params.user_id, params.year).await {
        return Ok(Json(cached));
    }

    let tax_file = state
        .db
        .get_tax_file_with_refund(&params.user_id, params.year)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "Tax file not found for user {} and year {}",
                params.user_id,
                params.year
            ))
        })?;

    let response = TaxFileResponse::from(tax_file);
    state
        .cache
        .put(&params.user_id, params.year, &response)
        .await;

    Ok(Json(response))
}

#[tracing::instrument(skip(state))]
pub async fn get_tax_user(
    State(state): State<AppState>,
    Query(params): Query<TaxUserParams>,
) -> Result<Json<TaxUserResponse>, AppError> {
    let user = state
        .db
        .get_user(&params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("User not found with ID {}", params.user_id))
        })?;

    let tax_files = state.db.list_tax_files_with_refunds(&params.user_id).await?;
    let total_files = tax_files.len();

    Ok(Json(TaxUserResponse {
        user_id: user.user_id,
        first_name: user.first_name,
        last_name: user.last_name,
        tax_files: tax_files.into_iter().map(Into::into).collect(),
        total_files,
    }))
}
