//! Payment lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Status of the payment owned by a reservation.
///
/// Transitions are monotonic and one-directional per path:
/// Pending→Paid, Pending→Failed, Paid→Cancelled. Failed and Cancelled are
/// terminal. A transition is persisted only after the gateway call that
/// justifies it returns a definitive result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Prepared alongside the reservation; awaiting confirmation.
    Pending,

    /// Confirmed and settled by the gateway.
    Paid,

    /// A settled payment that was reversed through the gateway.
    Cancelled,

    /// Confirmation definitively failed.
    Failed,
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!((self, target), (Pending, Paid) | (Pending, Failed) | (Paid, Cancelled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Paid, Failed],
            Paid => vec![Cancelled],
            Cancelled => vec![],
            Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_settle_or_fail() {
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Failed));
    }

    #[test]
    fn paid_can_only_be_cancelled() {
        assert!(PaymentStatus::Paid.can_transition_to(&PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Paid.can_transition_to(&PaymentStatus::Failed));
        assert!(!PaymentStatus::Paid.can_transition_to(&PaymentStatus::Pending));
    }

    #[test]
    fn failed_and_cancelled_are_terminal() {
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn no_backwards_transitions_exist() {
        for from in [PaymentStatus::Cancelled, PaymentStatus::Failed] {
            for to in [PaymentStatus::Pending, PaymentStatus::Paid] {
                assert!(!from.can_transition_to(&to), "{:?} -> {:?} must be invalid", from, to);
            }
        }
    }
}
