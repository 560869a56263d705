//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | AlreadyProcessed | 409 |
//! | AmountMismatch | 400 |
//! | ConfirmFailed / CancelFailed | 402 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode};

use super::{OrderId, PaymentStatus};

/// Payment-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No payment exists for this order id.
    NotFound(OrderId),

    /// The payment is not in the state the operation requires.
    AlreadyProcessed { order_id: OrderId, status: PaymentStatus },

    /// The submitted amount does not match the prepared amount.
    AmountMismatch { expected: i64, actual: i64 },

    /// The gateway did not confirm the payment.
    ConfirmFailed { reason: String },

    /// The gateway did not reverse the payment; it remains settled.
    CancelFailed { reason: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl PaymentError {
    pub fn not_found(order_id: OrderId) -> Self {
        PaymentError::NotFound(order_id)
    }

    pub fn already_processed(order_id: OrderId, status: PaymentStatus) -> Self {
        PaymentError::AlreadyProcessed { order_id, status }
    }

    pub fn amount_mismatch(expected: i64, actual: i64) -> Self {
        PaymentError::AmountMismatch { expected, actual }
    }

    pub fn confirm_failed(reason: impl Into<String>) -> Self {
        PaymentError::ConfirmFailed { reason: reason.into() }
    }

    pub fn cancel_failed(reason: impl Into<String>) -> Self {
        PaymentError::CancelFailed { reason: reason.into() }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            // An absent payment means the reservation it belongs to is unknown.
            PaymentError::NotFound(_) => ErrorCode::ReservationNotFound,
            PaymentError::AlreadyProcessed { .. } => ErrorCode::PaymentAlreadyProcessed,
            PaymentError::AmountMismatch { .. } => ErrorCode::PaymentConfirmFailed,
            PaymentError::ConfirmFailed { .. } => ErrorCode::PaymentConfirmFailed,
            PaymentError::CancelFailed { .. } => ErrorCode::PaymentCancelFailed,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::NotFound(order_id) => {
                format!("No payment found for order {}", order_id)
            }
            PaymentError::AlreadyProcessed { order_id, status } => {
                format!("Payment for order {} was already processed ({:?})", order_id, status)
            }
            PaymentError::AmountMismatch { expected, actual } => {
                format!("Payment amount mismatch: expected {}, got {}", expected, actual)
            }
            PaymentError::ConfirmFailed { reason } => {
                format!("Payment confirmation failed: {}", reason)
            }
            PaymentError::CancelFailed { reason } => {
                format!("Payment cancellation failed: {}", reason)
            }
            PaymentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PaymentError {}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Infrastructure(err.to_string())
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_id() -> OrderId {
        OrderId::new("ord-aaaa-bbbb-1")
    }

    #[test]
    fn not_found_maps_to_reservation_not_found() {
        assert_eq!(
            PaymentError::not_found(order_id()).code(),
            ErrorCode::ReservationNotFound
        );
    }

    #[test]
    fn already_processed_carries_current_status() {
        let err = PaymentError::already_processed(order_id(), PaymentStatus::Failed);
        assert_eq!(err.code(), ErrorCode::PaymentAlreadyProcessed);
        assert!(err.message().contains("Failed"));
    }

    #[test]
    fn amount_mismatch_is_a_confirm_failure() {
        let err = PaymentError::amount_mismatch(50_000, 45_000);
        assert_eq!(err.code(), ErrorCode::PaymentConfirmFailed);
        assert!(err.message().contains("50000"));
        assert!(err.message().contains("45000"));
    }

    #[test]
    fn confirm_and_cancel_failures_keep_their_codes() {
        assert_eq!(
            PaymentError::confirm_failed("declined").code(),
            ErrorCode::PaymentConfirmFailed
        );
        assert_eq!(
            PaymentError::cancel_failed("timeout").code(),
            ErrorCode::PaymentCancelFailed
        );
    }

    #[test]
    fn converts_to_domain_error() {
        let err = PaymentError::confirm_failed("declined");
        let domain: DomainError = err.clone().into();
        assert_eq!(domain.code, err.code());
        assert!(domain.message.contains("declined"));
    }
}
