//! Globally unique order identifier handed to the payment gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, UserId};

/// Order identifier for one payment.
///
/// Derived deterministically from the client id, the advisor id, and the
/// creation timestamp, so concurrent bookings by the same pair still get
/// distinct orders while the id remains traceable to its parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wraps an existing order id string (e.g. loaded from storage).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a fresh order id for a booking.
    pub fn generate(client_id: UserId, advisor_id: UserId, at: Timestamp) -> Self {
        Self(format!(
            "ord-{}-{}-{}",
            client_id.short(),
            advisor_id.short(),
            at.unix_millis()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
