//! Fire-and-forget outcome notifications.
//!
//! Delivery transport is an already-built publish/consume mechanism
//! outside this core. Emission is best-effort: callers log failures and
//! never roll back the business operation that triggered them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// Notification categories the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReservationBooked,
    ReservationCanceled,
}

/// One notification addressed to a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub target_user_id: UserId,
    pub kind: NotificationKind,

    /// Kind-specific payload; consumers render it.
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(target_user_id: UserId, kind: NotificationKind, payload: serde_json::Value) -> Self {
        Self {
            target_user_id,
            kind,
            payload,
        }
    }
}

/// Port for publishing notifications.
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// Publishes one notification. No delivery guarantee is implied.
    async fn publish(&self, notification: Notification) -> Result<(), DomainError>;
}
