//! In-memory notification emitter for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Notification, NotificationEmitter};

/// Collects notifications instead of delivering them.
#[derive(Default)]
pub struct InMemoryNotificationEmitter {
    published: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications published so far.
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }

    /// Removes and returns everything published so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

#[async_trait]
impl NotificationEmitter for InMemoryNotificationEmitter {
    async fn publish(&self, notification: Notification) -> Result<(), DomainError> {
        self.published.lock().unwrap().push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::ports::NotificationKind;
    use serde_json::json;

    #[tokio::test]
    async fn collects_and_drains() {
        let emitter = InMemoryNotificationEmitter::new();
        emitter
            .publish(Notification::new(
                UserId::new(),
                NotificationKind::ReservationBooked,
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(emitter.published().len(), 1);
        assert_eq!(emitter.drain().len(), 1);
        assert!(emitter.published().is_empty());
    }
}
