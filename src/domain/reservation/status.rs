//! Reservation lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a reservation.
///
/// `Approved` is set by the advisor-confirmation process outside this core;
/// the transition exists here so the state machine stays complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booked and awaiting advisor confirmation.
    Pending,

    /// Confirmed by the advisor; locked against cancellation.
    Approved,

    /// Canceled by the client or the advisor.
    Canceled,
}

impl ReservationStatus {
    /// A reservation still occupies its slot unless it has been canceled.
    pub fn occupies_slot(&self) -> bool {
        *self != ReservationStatus::Canceled
    }
}

impl StateMachine for ReservationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ReservationStatus::*;
        matches!((self, target), (Pending, Approved) | (Pending, Canceled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ReservationStatus::*;
        match self {
            Pending => vec![Approved, Canceled],
            Approved => vec![],
            Canceled => vec![],
        }
    }
}
