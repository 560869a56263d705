//! Error types for the domain layer.
//!
//! Every user-visible failure maps to a stable `ErrorCode` plus a
//! human-readable message; internal identifiers and stack traces are
//! never exposed past the boundary.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Slot validation errors
    RoleNotPermitted,
    PastDateNotAllowed,
    SameDayReservationNotAllowed,
    WeekendNotAllowed,
    OutsideBusinessHours,
    SelfReservationNotAllowed,
    TimeSlotBlocked,

    // Conflict errors
    TimeSlotAlreadyReserved,

    // Not found errors
    ReservationNotFound,
    AdvisorNotFound,

    // Cancellation errors
    UnauthorizedCancelRequest,
    AlreadyCanceledReservation,
    ReservationNotCancelable,
    SameDayCancelNotAllowed,

    // Payment errors
    PaymentConfirmFailed,
    PaymentCancelFailed,
    PaymentAlreadyProcessed,

    // Generic validation / state errors
    ValidationFailed,
    InvalidStateTransition,

    // Infrastructure errors
    DatabaseError,
    GatewayError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::RoleNotPermitted => "ROLE_NOT_PERMITTED",
            ErrorCode::PastDateNotAllowed => "PAST_DATE_NOT_ALLOWED",
            ErrorCode::SameDayReservationNotAllowed => "SAME_DAY_RESERVATION_NOT_ALLOWED",
            ErrorCode::WeekendNotAllowed => "WEEKEND_NOT_ALLOWED",
            ErrorCode::OutsideBusinessHours => "OUTSIDE_BUSINESS_HOURS",
            ErrorCode::SelfReservationNotAllowed => "SELF_RESERVATION_NOT_ALLOWED",
            ErrorCode::TimeSlotBlocked => "TIME_SLOT_BLOCKED",
            ErrorCode::TimeSlotAlreadyReserved => "TIME_SLOT_ALREADY_RESERVED",
            ErrorCode::ReservationNotFound => "RESERVATION_NOT_FOUND",
            ErrorCode::AdvisorNotFound => "ADVISOR_NOT_FOUND",
            ErrorCode::UnauthorizedCancelRequest => "UNAUTHORIZED_CANCEL_REQUEST",
            ErrorCode::AlreadyCanceledReservation => "ALREADY_CANCELED_RESERVATION",
            ErrorCode::ReservationNotCancelable => "RESERVATION_NOT_CANCELABLE",
            ErrorCode::SameDayCancelNotAllowed => "SAME_DAY_CANCEL_NOT_ALLOWED",
            ErrorCode::PaymentConfirmFailed => "PAYMENT_CONFIRM_FAILED",
            ErrorCode::PaymentCancelFailed => "PAYMENT_CANCEL_FAILED",
            ErrorCode::PaymentAlreadyProcessed => "PAYMENT_ALREADY_PROCESSED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::GatewayError => "GATEWAY_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
