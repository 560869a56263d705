//! Availability store port - the persistence boundary for reservations.
//!
//! The store is the final arbiter of slot conflicts: `insert_if_absent`
//! relies on a uniqueness constraint over (advisor, date, start) scoped to
//! non-canceled rows, and reports a taken slot as a value rather than an
//! error so the booking engine can translate it deliberately.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ReservationId, UserId};
use crate::domain::payment::Payment;
use crate::domain::reservation::{CancellationRecord, Reservation, Slot};

/// Advisor data the booking engine needs: approval is implied by presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorProfile {
    pub advisor_id: UserId,
    pub display_name: String,

    /// Consultation fee per one-hour slot, whole currency units.
    pub consultation_fee: i64,
}

/// Result of the atomic conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Reservation and payment rows were written.
    Inserted,

    /// A non-canceled reservation already holds the slot.
    SlotTaken,
}

/// Port for reservation persistence.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Looks up an advisor, returning None when absent or not approved.
    async fn approved_advisor(&self, advisor_id: UserId)
        -> Result<Option<AdvisorProfile>, DomainError>;

    /// True if the slot falls inside an advisor-defined blocked interval.
    async fn is_time_blocked(&self, advisor_id: UserId, slot: &Slot) -> Result<bool, DomainError>;

    /// True if a non-canceled reservation exists for the slot.
    ///
    /// Fast-path only. A second request can interleave between this check
    /// and the insert, so callers must still treat `insert_if_absent` as
    /// the authoritative conflict detector.
    async fn conflict_exists(&self, advisor_id: UserId, slot: &Slot) -> Result<bool, DomainError>;

    /// Inserts the reservation and its payment in a single transaction.
    ///
    /// Returns `SlotTaken` when the active-slot uniqueness constraint
    /// rejects the reservation row; nothing is written in that case.
    async fn insert_if_absent(
        &self,
        reservation: &Reservation,
        payment: &Payment,
    ) -> Result<InsertOutcome, DomainError>;

    /// Loads a reservation by id.
    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError>;

    /// Marks a reservation canceled and attaches the cancellation record.
    ///
    /// Implementations must guard the update on the row not already being
    /// canceled, so the record is written exactly once.
    async fn mark_canceled(
        &self,
        id: ReservationId,
        record: &CancellationRecord,
    ) -> Result<(), DomainError>;

    /// Display name of any platform user, for notification payloads.
    async fn display_name(&self, user_id: UserId) -> Result<Option<String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ReservationStore) {}
    }
}
