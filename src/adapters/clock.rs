//! System clock adapter.

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Production clock reading the process-wide wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
