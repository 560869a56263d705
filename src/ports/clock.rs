//! Current-time source.
//!
//! Same-day rules make the core time-dependent; injecting the clock keeps
//! the handlers testable without freezing the process clock.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    /// The current moment, UTC.
    fn now(&self) -> Timestamp;
}
