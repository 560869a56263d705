//! Reservation aggregate entity.
//!
//! A reservation binds a client and an advisor to a one-hour slot.
//!
//! # Invariants
//!
//! - For a given (advisor, date, start) at most one reservation exists whose
//!   status is not Canceled; the database partial unique index is the final
//!   arbiter under concurrency.
//! - Status transitions follow the `ReservationStatus` state machine.
//! - A `CancellationRecord` is attached exactly once, when the Canceled
//!   transition commits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Actor, ReservationId, StateMachine, Timestamp, UserId};

use super::{CancellationRecord, ReservationError, ReservationStatus, Slot};

/// Reservation aggregate - one booked consultation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier for this reservation.
    pub id: ReservationId,

    /// Client who booked the consultation.
    pub client_id: UserId,

    /// Advisor the consultation is booked with.
    pub advisor_id: UserId,

    /// The reserved one-hour slot.
    pub slot: Slot,

    /// Free-text request message from the client.
    pub message: String,

    /// Current lifecycle status.
    pub status: ReservationStatus,

    /// Cancellation details, present only when status is Canceled.
    pub cancellation: Option<CancellationRecord>,

    /// When the reservation was created.
    pub created_at: Timestamp,

    /// When the reservation was last updated.
    pub updated_at: Timestamp,
}

impl Reservation {
    /// Creates a new Pending reservation for the given slot.
    pub fn request(
        id: ReservationId,
        client_id: UserId,
        advisor_id: UserId,
        slot: Slot,
        message: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            client_id,
            advisor_id,
            slot,
            message: message.into(),
            status: ReservationStatus::Pending,
            cancellation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the given user is a party to this reservation.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.client_id == user_id || self.advisor_id == user_id
    }

    /// The other party relative to the given user.
    ///
    /// Returns None if the user is not a party to the reservation.
    pub fn counterparty_of(&self, user_id: UserId) -> Option<UserId> {
        if user_id == self.client_id {
            Some(self.advisor_id)
        } else if user_id == self.advisor_id {
            Some(self.client_id)
        } else {
            None
        }
    }

    /// Checks the cancellation preconditions in policy order.
    ///
    /// Order: authorization, already-canceled, approved-lock, same-day.
    /// The reservation date must be strictly after `today`.
    pub fn ensure_cancelable(&self, actor: &Actor, today: NaiveDate) -> Result<(), ReservationError> {
        if !self.involves(actor.id) {
            return Err(ReservationError::UnauthorizedCancelRequest);
        }
        match self.status {
            ReservationStatus::Canceled => {
                return Err(ReservationError::already_canceled(self.id));
            }
            ReservationStatus::Approved => {
                return Err(ReservationError::not_cancelable(self.status));
            }
            ReservationStatus::Pending => {}
        }
        // Also catches past dates, which should not exist here.
        if self.slot.date <= today {
            return Err(ReservationError::SameDayCancelNotAllowed);
        }
        Ok(())
    }

    /// Transitions this reservation to Canceled, attaching the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the current status does not permit cancellation.
    pub fn cancel(&mut self, record: CancellationRecord) -> Result<(), ReservationError> {
        self.status = match self.status.transition_to(ReservationStatus::Canceled) {
            Ok(status) => status,
            Err(_) if self.status == ReservationStatus::Canceled => {
                return Err(ReservationError::already_canceled(self.id));
            }
            Err(_) => return Err(ReservationError::not_cancelable(self.status)),
        };
        self.updated_at = record.canceled_at;
        self.cancellation = Some(record);
        Ok(())
    }

    /// Transitions this reservation to Approved.
    ///
    /// Driven by the advisor-confirmation process outside this core.
    pub fn approve(&mut self, now: Timestamp) -> Result<(), ReservationError> {
        self.status = self
            .status
            .transition_to(ReservationStatus::Approved)
            .map_err(|_| ReservationError::not_cancelable(self.status))?;
        self.updated_at = now;
        Ok(())
    }
}
