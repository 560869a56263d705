//! Request/response DTOs for the reservation API.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::{
    CancelReservationResult, ConfirmPaymentResult, CreateReservationResult,
};
use crate::domain::foundation::Timestamp;
use crate::domain::payment::PaymentStatus;
use crate::domain::reservation::CancelReason;
use crate::ports::ReservationSummary;

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// POST /reservations request body.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub advisor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub message: String,
}

/// POST /reservations response body.
#[derive(Debug, Serialize)]
pub struct CreateReservationResponse {
    pub reservation_id: Uuid,
    pub order_id: String,
    pub amount: i64,
    pub order_name: String,
    pub advisor_name: String,
}

impl From<CreateReservationResult> for CreateReservationResponse {
    fn from(result: CreateReservationResult) -> Self {
        Self {
            reservation_id: *result.reservation_id.as_uuid(),
            order_id: result.order_id.to_string(),
            amount: result.amount,
            order_name: result.order_name,
            advisor_name: result.advisor_name,
        }
    }
}

/// POST /payments/confirm request body, from the gateway redirect.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub order_id: String,
    pub payment_key: String,
    pub amount: i64,
}

/// POST /payments/confirm response body.
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub order_id: String,
    pub status: PaymentStatus,
    pub approved_at: Timestamp,
}

impl From<ConfirmPaymentResult> for ConfirmPaymentResponse {
    fn from(result: ConfirmPaymentResult) -> Self {
        Self {
            order_id: result.order_id.to_string(),
            status: result.status,
            approved_at: result.approved_at,
        }
    }
}

/// POST /reservations/{id}/cancel request body.
#[derive(Debug, Deserialize)]
pub struct CancelReservationRequest {
    pub reason: CancelReason,
    #[serde(default)]
    pub memo: String,
}

/// POST /reservations/{id}/cancel response body.
#[derive(Debug, Serialize)]
pub struct CancelReservationResponse {
    pub reservation_id: Uuid,
    pub canceled_at: Timestamp,
}

impl From<CancelReservationResult> for CancelReservationResponse {
    fn from(result: CancelReservationResult) -> Self {
        Self {
            reservation_id: *result.reservation_id.as_uuid(),
            canceled_at: result.canceled_at,
        }
    }
}

/// GET /reservations query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListReservationsQuery {
    #[serde(default)]
    pub page: u32,
    pub size: Option<u32>,
}

/// GET /reservations response body.
#[derive(Debug, Serialize)]
pub struct ListReservationsResponse {
    pub reservations: Vec<ReservationSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_parses_with_default_message() {
        let json = r#"{
            "advisor_id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2025-07-30",
            "start_time": "14:00:00"
        }"#;
        let request: CreateReservationRequest = serde_json::from_str(json).unwrap();
        assert!(request.message.is_empty());
    }

    #[test]
    fn cancel_request_parses_reason_codes() {
        let json = r#"{ "reason": "schedule_conflict", "memo": "sorry" }"#;
        let request: CancelReservationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.reason, CancelReason::ScheduleConflict);
        assert_eq!(request.memo, "sorry");
    }

    #[test]
    fn error_response_serializes_both_fields() {
        let json =
            serde_json::to_string(&ErrorResponse::new("TIME_SLOT_BLOCKED", "blocked")).unwrap();
        assert!(json.contains("TIME_SLOT_BLOCKED"));
        assert!(json.contains("blocked"));
    }
}
