//! Log-only notification emitter.
//!
//! Stands in for the platform's delivery pipeline when none is wired up;
//! every notification becomes a structured log line.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Notification, NotificationEmitter};

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationEmitter;

impl LoggingNotificationEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationEmitter for LoggingNotificationEmitter {
    async fn publish(&self, notification: Notification) -> Result<(), DomainError> {
        tracing::info!(
            target_user_id = %notification.target_user_id,
            kind = ?notification.kind,
            payload = %notification.payload,
            "notification"
        );
        Ok(())
    }
}
