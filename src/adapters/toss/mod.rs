//! Toss Payments gateway adapter.

mod gateway;
mod mock;

pub use gateway::{TossConfig, TossGateway};
pub use mock::MockGateway;
