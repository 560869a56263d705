//! Reservation-specific error types.
//!
//! Covers the booking and cancellation taxonomy. Several call sites branch
//! on the specific variant, so domain failures are explicit enum values
//! rather than stringly-typed errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | RoleNotPermitted | 403 |
//! | PastDateNotAllowed / SameDayReservationNotAllowed | 400 |
//! | WeekendNotAllowed / OutsideBusinessHours | 400 |
//! | SelfReservationNotAllowed | 400 |
//! | AdvisorNotFound / NotFound | 404 |
//! | TimeSlotBlocked / TimeSlotAlreadyReserved | 409 |
//! | UnauthorizedCancelRequest | 403 |
//! | AlreadyCanceled / NotCancelable / SameDayCancelNotAllowed | 409 |
//! | Payment(_) | follows the wrapped payment error |
//! | Infrastructure | 500 |

use chrono::{NaiveDate, NaiveTime};

use crate::domain::foundation::{ActorRole, DomainError, ErrorCode, ReservationId, UserId};
use crate::domain::payment::PaymentError;

use super::ReservationStatus;

/// Reservation-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Only clients may create reservations.
    RoleNotPermitted { role: ActorRole },

    /// Requested date is before today.
    PastDateNotAllowed { date: NaiveDate },

    /// Same-day bookings are not permitted at all.
    SameDayReservationNotAllowed,

    /// Requested date falls on a weekend.
    WeekendNotAllowed { date: NaiveDate },

    /// Requested start time is outside bookable hours.
    OutsideBusinessHours { start: NaiveTime },

    /// A user cannot book a consultation with themselves.
    SelfReservationNotAllowed,

    /// Advisor does not exist or is not approved.
    AdvisorNotFound(UserId),

    /// The slot falls inside an advisor-defined blocked interval.
    TimeSlotBlocked,

    /// Another non-canceled reservation holds the slot.
    TimeSlotAlreadyReserved,

    /// Reservation was not found.
    NotFound(ReservationId),

    /// Actor is neither the client nor the advisor on the reservation.
    UnauthorizedCancelRequest,

    /// The reservation has already been canceled.
    AlreadyCanceled(ReservationId),

    /// The reservation is locked against cancellation.
    NotCancelable { status: ReservationStatus },

    /// Cancellation is only allowed strictly before the slot date.
    SameDayCancelNotAllowed,

    /// A payment step of the cancellation workflow failed.
    Payment(PaymentError),

    /// Infrastructure error.
    Infrastructure(String),
}

impl ReservationError {
    pub fn not_found(id: ReservationId) -> Self {
        ReservationError::NotFound(id)
    }

    pub fn already_canceled(id: ReservationId) -> Self {
        ReservationError::AlreadyCanceled(id)
    }

    pub fn not_cancelable(status: ReservationStatus) -> Self {
        ReservationError::NotCancelable { status }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ReservationError::Infrastructure(message.into())
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReservationError::RoleNotPermitted { .. } => ErrorCode::RoleNotPermitted,
            ReservationError::PastDateNotAllowed { .. } => ErrorCode::PastDateNotAllowed,
            ReservationError::SameDayReservationNotAllowed => {
                ErrorCode::SameDayReservationNotAllowed
            }
            ReservationError::WeekendNotAllowed { .. } => ErrorCode::WeekendNotAllowed,
            ReservationError::OutsideBusinessHours { .. } => ErrorCode::OutsideBusinessHours,
            ReservationError::SelfReservationNotAllowed => ErrorCode::SelfReservationNotAllowed,
            ReservationError::AdvisorNotFound(_) => ErrorCode::AdvisorNotFound,
            ReservationError::TimeSlotBlocked => ErrorCode::TimeSlotBlocked,
            ReservationError::TimeSlotAlreadyReserved => ErrorCode::TimeSlotAlreadyReserved,
            ReservationError::NotFound(_) => ErrorCode::ReservationNotFound,
            ReservationError::UnauthorizedCancelRequest => ErrorCode::UnauthorizedCancelRequest,
            ReservationError::AlreadyCanceled(_) => ErrorCode::AlreadyCanceledReservation,
            ReservationError::NotCancelable { .. } => ErrorCode::ReservationNotCancelable,
            ReservationError::SameDayCancelNotAllowed => ErrorCode::SameDayCancelNotAllowed,
            ReservationError::Payment(err) => err.code(),
            ReservationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            ReservationError::RoleNotPermitted { role } => {
                format!("A {} may not create reservations", role)
            }
            ReservationError::PastDateNotAllowed { date } => {
                format!("Cannot book a past date: {}", date)
            }
            ReservationError::SameDayReservationNotAllowed => {
                "Same-day reservations are not permitted".to_string()
            }
            ReservationError::WeekendNotAllowed { date } => {
                format!("{} falls on a weekend", date)
            }
            ReservationError::OutsideBusinessHours { start } => {
                format!("Slots must start between 09:00 and 19:00, got {}", start.format("%H:%M"))
            }
            ReservationError::SelfReservationNotAllowed => {
                "Cannot book a consultation with yourself".to_string()
            }
            ReservationError::AdvisorNotFound(id) => {
                format!("Advisor not found or not approved: {}", id)
            }
            ReservationError::TimeSlotBlocked => {
                "The advisor has blocked this time slot".to_string()
            }
            ReservationError::TimeSlotAlreadyReserved => {
                "The time slot is already reserved".to_string()
            }
            ReservationError::NotFound(id) => format!("Reservation not found: {}", id),
            ReservationError::UnauthorizedCancelRequest => {
                "Only the client or the advisor on a reservation may cancel it".to_string()
            }
            ReservationError::AlreadyCanceled(id) => {
                format!("Reservation {} has already been canceled", id)
            }
            ReservationError::NotCancelable { status } => {
                format!("A reservation in {:?} state cannot be canceled", status)
            }
            ReservationError::SameDayCancelNotAllowed => {
                "Reservations can only be canceled before the consultation date".to_string()
            }
            ReservationError::Payment(err) => err.message(),
            ReservationError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ReservationError {}

impl From<PaymentError> for ReservationError {
    fn from(err: PaymentError) -> Self {
        ReservationError::Payment(err)
    }
}

impl From<DomainError> for ReservationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::TimeSlotAlreadyReserved => ReservationError::TimeSlotAlreadyReserved,
            _ => ReservationError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ReservationError> for DomainError {
    fn from(err: ReservationError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ReservationError::TimeSlotAlreadyReserved.code(),
            ErrorCode::TimeSlotAlreadyReserved
        );
        assert_eq!(
            ReservationError::SameDayCancelNotAllowed.code(),
            ErrorCode::SameDayCancelNotAllowed
        );
        assert_eq!(
            ReservationError::UnauthorizedCancelRequest.code(),
            ErrorCode::UnauthorizedCancelRequest
        );
    }

    #[test]
    fn not_found_message_includes_id() {
        let id = ReservationId::new();
        let err = ReservationError::not_found(id);
        assert!(err.message().contains(&id.to_string()));
    }

    #[test]
    fn payment_variant_delegates_code() {
        let err = ReservationError::Payment(PaymentError::cancel_failed("gateway down"));
        assert_eq!(err.code(), ErrorCode::PaymentCancelFailed);
    }

    #[test]
    fn storage_conflict_translates_to_slot_taken() {
        let db = DomainError::new(ErrorCode::TimeSlotAlreadyReserved, "duplicate key");
        let err: ReservationError = db.into();
        assert!(matches!(err, ReservationError::TimeSlotAlreadyReserved));
    }

    #[test]
    fn converts_to_domain_error() {
        let err = ReservationError::SelfReservationNotAllowed;
        let domain: DomainError = err.clone().into();
        assert_eq!(domain.code, err.code());
    }

    #[test]
    fn display_matches_message() {
        let err = ReservationError::TimeSlotBlocked;
        assert_eq!(format!("{}", err), err.message());
    }
}
