//! Adapters - Implementations of ports for external systems.
//!
//! - `postgres` - sqlx-backed store, repository, and reader
//! - `toss` - REST payment gateway client and a configurable test mock
//! - `notifications` - in-memory and log-only notification emitters
//! - `http` - thin axum controllers over the command handlers
//! - `clock` - system clock

mod clock;
pub mod http;
pub mod notifications;
pub mod postgres;
pub mod toss;

pub use clock::SystemClock;
pub use notifications::{InMemoryNotificationEmitter, LoggingNotificationEmitter};
pub use postgres::{PostgresPaymentRepository, PostgresReservationReader, PostgresReservationStore};
pub use toss::{MockGateway, TossConfig, TossGateway};
