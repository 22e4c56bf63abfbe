use anyhow::anyhow;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

use crate::models::ErrorDetail;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRefundEventRequest {
    #[validate(length(min = 1, message = "Event ID is required"))]
    pub event_id: String,
    #[validate(length(min = 1, message = "File ID is required"))]
    pub file_id: String,
    #[validate(length(min = 1, message = "Event type is required"))]
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub event_date: Option<DateTime<Utc>>,
    pub error_reasons: Option<Vec<ErrorDetail>>,
}

/// Push-subscription envelope: the real event is a base64-encoded JSON
/// document under `message.data`.
#[derive(Debug, Deserialize)]
struct PushEnvelope {
    message: PushMessage,
}

#[derive(Debug, Deserialize)]
struct PushMessage {
    data: String,
}

impl ProcessRefundEventRequest {
    /// Decode either accepted body shape: a push envelope when a `message`
    /// field is present, the direct event object otherwise. Every decode
    /// failure is the same bad-request class.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        if body.get("message").is_some() {
            let envelope: PushEnvelope = serde_json::from_value(body)
                .map_err(|e| AppError::BadRequest(anyhow!("Malformed push envelope: {}", e)))?;
            let decoded = BASE64
                .decode(envelope.message.data.as_bytes())
                .map_err(|e| AppError::BadRequest(anyhow!("Invalid base64 payload: {}", e)))?;
            serde_json::from_slice(&decoded)
                .map_err(|e| AppError::BadRequest(anyhow!("Malformed event payload: {}", e)))
        } else {
            serde_json::from_value(body)
                .map_err(|e| AppError::BadRequest(anyhow!("Malformed event payload: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn direct_event() -> Value {
        json!({
            "eventId": "evt-1",
            "fileId": "1f0e7a55-9a6f-4c5a-bbde-3c0a82f2a6c1",
            "type": "refund.error",
            "data": {
                "eventDate": "2024-03-01T12:00:00Z",
                "errorReasons": [
                    {"code": "SSN_MISMATCH", "message": "SSN does not match"}
                ]
            }
        })
    }

    #[test]
    fn decodes_the_direct_shape() {
        let request = ProcessRefundEventRequest::from_body(direct_event()).unwrap();
        assert_eq!(request.event_id, "evt-1");
        assert_eq!(request.event_type, "refund.error");
        let reasons = request.data.error_reasons.unwrap();
        assert_eq!(reasons[0].code, "SSN_MISMATCH");
    }

    #[test]
    fn decodes_a_push_envelope() {
        let encoded = BASE64.encode(direct_event().to_string());
        let body = json!({
            "message": {"data": encoded, "messageId": "m-1"},
            "subscription": "projects/p/subscriptions/s"
        });

        let request = ProcessRefundEventRequest::from_body(body).unwrap();
        assert_eq!(request.file_id, "1f0e7a55-9a6f-4c5a-bbde-3c0a82f2a6c1");
        assert_eq!(request.data.event_date.unwrap().to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn rejects_bad_base64() {
        let body = json!({"message": {"data": "%%% not base64 %%%"}});
        assert!(ProcessRefundEventRequest::from_body(body).is_err());
    }

    #[test]
    fn rejects_envelopes_without_a_data_field() {
        let body = json!({"message": {"messageId": "m-1"}});
        assert!(ProcessRefundEventRequest::from_body(body).is_err());
    }

    #[test]
    fn rejects_garbage_inside_the_envelope() {
        let encoded = BASE64.encode("this is not json");
        let body = json!({"message": {"data": encoded}});
        assert!(ProcessRefundEventRequest::from_body(body).is_err());
    }

    #[test]
    fn rejects_direct_bodies_missing_required_fields() {
        let body = json!({"eventId": "evt-1", "type": "refund.approved"});
        assert!(ProcessRefundEventRequest::from_body(body).is_err());
    }

    #[test]
    fn event_date_is_optional() {
        let body = json!({
            "eventId": "evt-2",
            "fileId": "1f0e7a55-9a6f-4c5a-bbde-3c0a82f2a6c1",
            "type": "refund.approved",
            "data": {}
        });
        let request = ProcessRefundEventRequest::from_body(body).unwrap();
        assert!(request.data.event_date.is_none());
        assert!(request.data.error_reasons.is_none());
    }
}
