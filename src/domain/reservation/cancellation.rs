//! Cancellation record attached to a canceled reservation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Closed set of cancellation reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    ScheduleConflict,
    NoLongerNeeded,
    BookedByMistake,
    AdvisorUnavailable,
    Other,
}

impl CancelReason {
    /// Human-readable label shown to the counter-party.
    pub fn label(&self) -> &'static str {
        match self {
            CancelReason::ScheduleConflict => "Schedule conflict",
            CancelReason::NoLongerNeeded => "Consultation no longer needed",
            CancelReason::BookedByMistake => "Booked by mistake",
            CancelReason::AdvisorUnavailable => "Advisor unavailable",
            CancelReason::Other => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::ScheduleConflict => "schedule_conflict",
            CancelReason::NoLongerNeeded => "no_longer_needed",
            CancelReason::BookedByMistake => "booked_by_mistake",
            CancelReason::AdvisorUnavailable => "advisor_unavailable",
            CancelReason::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "schedule_conflict" => Some(CancelReason::ScheduleConflict),
            "no_longer_needed" => Some(CancelReason::NoLongerNeeded),
            "booked_by_mistake" => Some(CancelReason::BookedByMistake),
            "advisor_unavailable" => Some(CancelReason::AdvisorUnavailable),
            "other" => Some(CancelReason::Other),
            _ => None,
        }
    }
}

/// Who canceled, why, and when.
///
/// Written exactly once, at the moment the CANCELED transition commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRecord {
    /// User who requested the cancellation (client or advisor).
    pub actor_id: UserId,

    /// Reason code.
    pub reason: CancelReason,

    /// Free-text memo from the canceling user.
    pub memo: String,

    /// When the cancellation committed.
    pub canceled_at: Timestamp,
}

impl CancellationRecord {
    pub fn new(actor_id: UserId, reason: CancelReason, memo: impl Into<String>, canceled_at: Timestamp) -> Self {
        Self {
            actor_id,
            reason,
            memo: memo.into(),
            canceled_at,
        }
    }
}
