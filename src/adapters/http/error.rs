//! Domain error to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::PaymentError;
use crate::domain::reservation::ReservationError;

use super::dto::ErrorResponse;

/// Error type returned by every HTTP handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(code: ErrorCode, message: String) -> Self {
        Self {
            status: status_for(code),
            code: code.to_string(),
            message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::ValidationFailed.to_string(),
            message: message.into(),
        }
    }
}

/// Stable code → status mapping; internals never leak past 500s.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::RoleNotPermitted | ErrorCode::UnauthorizedCancelRequest => {
            StatusCode::FORBIDDEN
        }
        ErrorCode::PastDateNotAllowed
        | ErrorCode::SameDayReservationNotAllowed
        | ErrorCode::WeekendNotAllowed
        | ErrorCode::OutsideBusinessHours
        | ErrorCode::SelfReservationNotAllowed
        | ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::ReservationNotFound | ErrorCode::AdvisorNotFound => StatusCode::NOT_FOUND,
        ErrorCode::TimeSlotBlocked
        | ErrorCode::TimeSlotAlreadyReserved
        | ErrorCode::AlreadyCanceledReservation
        | ErrorCode::ReservationNotCancelable
        | ErrorCode::SameDayCancelNotAllowed
        | ErrorCode::PaymentAlreadyProcessed
        | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::PaymentConfirmFailed | ErrorCode::PaymentCancelFailed => {
            StatusCode::PAYMENT_REQUIRED
        }
        ErrorCode::DatabaseError | ErrorCode::GatewayError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
            // Do not leak internals to the client.
            let body = ErrorResponse::new(
                ErrorCode::InternalError.to_string(),
                "An internal error occurred",
            );
            return (self.status, Json(body)).into_response();
        }
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        Self::new(err.code(), err.message())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::new(err.code(), err.message())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::new(err.code, err.message)
    }
}
