//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Advisorly domain.

mod actor;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use actor::{Actor, ActorRole};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ReservationId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
