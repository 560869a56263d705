//! Payment repository port with status-guarded transitions.
//!
//! Confirm and cancel race against each other on the same payment row, so
//! plain load-then-update is not enough. Every transition method must
//! re-check the current status under a row-level lock (or equivalent) in
//! the same transaction as the update, and report what it found instead of
//! blindly overwriting.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ReservationId, Timestamp};
use crate::domain::payment::{OrderId, Payment, PaymentStatus};

/// Facts recorded when the gateway settles a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSettlement {
    pub payment_key: String,
    pub method: Option<String>,
    pub receipt_url: Option<String>,
    pub approved_at: Timestamp,
}

/// Facts recorded when confirmation definitively fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFailure {
    pub code: String,
    pub reason: String,
    pub failed_at: Timestamp,
}

/// Facts recorded when a settled payment is reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReversal {
    pub reason: String,
    pub canceled_at: Timestamp,
}

/// What a guarded transition found when it took the row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The row was in the expected source state and was updated.
    Applied,

    /// The row was already in the target state; nothing was changed.
    ///
    /// Lets a retried confirm be a no-op instead of a corruption.
    AlreadyApplied,

    /// The row was in some other state; nothing was changed.
    InvalidState(PaymentStatus),
}

/// Port for payment persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Loads a payment by its order id.
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError>;

    /// Loads the payment owned by a reservation.
    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<Payment>, DomainError>;

    /// Pending → Paid, guarded on the row still being Pending.
    async fn mark_paid(
        &self,
        order_id: &OrderId,
        settlement: &PaymentSettlement,
    ) -> Result<TransitionOutcome, DomainError>;

    /// Pending → Failed, guarded on the row still being Pending.
    async fn mark_failed(
        &self,
        order_id: &OrderId,
        failure: &PaymentFailure,
    ) -> Result<TransitionOutcome, DomainError>;

    /// Paid → Cancelled, guarded on the row still being Paid.
    async fn mark_cancelled(
        &self,
        order_id: &OrderId,
        reversal: &PaymentReversal,
    ) -> Result<TransitionOutcome, DomainError>;
}
