use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::ProcessRefundEventRequest;
use crate::models::{NewRefundEvent, RefundEventType, RefundStatus};
use crate::startup::AppState;
use service_core::error::AppError;

/// Apply one refund lifecycle event delivered over HTTP, either as a direct
/// event object or wrapped in a push envelope.
#[tracing::instrument(skip(state, body))]
pub async fn process_refund_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode, AppError> {
    let request = ProcessRefundEventRequest::from_body(body)?;
    request.validate()?;

    tracing::info!(
        event_id = %request.event_id,
        file_id = %request.file_id,
        event_type = %request.event_type,
        "Processing refund event"
    );

    let file_id = Uuid::parse_str(&request.file_id).map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!("Invalid file ID: {}", request.file_id))
    })?;
    let event_type = RefundEventType::from_value(&request.event_type).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Unknown event type: {}",
            request.event_type
        ))
    })?;

    let refund = state
        .db
        .get_refund_by_file_id(file_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Refund not found for file ID: {}", file_id))
        })?;

    let current = RefundStatus::from_string(&refund.refund_status);
    let new_status = event_type.apply(current);
    if new_status.is_none() {
        tracing::info!(file_id = %file_id, "Refund already in progress, skipping status update");
    }

    let error_reasons = request
        .data
        .error_reasons
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize error reasons: {}", e))
        })?;

    // Only an error event rewrites the refund's stored error list; the audit
    // record keeps the reasons for every event kind.
    let refund_errors = match event_type {
        RefundEventType::Error => error_reasons.clone(),
        _ => None,
    };

    state
        .db
        .apply_refund_event(
            new_status,
            refund_errors,
            &NewRefundEvent {
                refund_id: refund.refund_id,
                event_type,
                event_date: request.data.event_date.unwrap_or_else(Utc::now),
                error_reasons,
            },
        )
        .await?;

    if let Some(status) = new_status {
        tracing::info!(file_id = %file_id, status = status.as_str(), "Refund status updated");
        state.cache.evict(&refund.user_id, refund.tax_year).await;
    }

    Ok(StatusCode::ACCEPTED)
}
