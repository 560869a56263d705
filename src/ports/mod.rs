//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ReservationStore` - persistence boundary enforcing the
//!   one-active-reservation-per-slot invariant
//! - `ReservationReader` - read side for reservation listings
//! - `PaymentRepository` - payment rows with status-guarded transitions
//! - `PaymentGateway` - the external payment processor
//! - `NotificationEmitter` - fire-and-forget outcome notifications
//! - `Clock` - current-time source, injectable for tests

mod clock;
mod notification_emitter;
mod payment_gateway;
mod payment_repository;
mod reservation_reader;
mod reservation_store;

pub use clock::Clock;
pub use notification_emitter::{Notification, NotificationEmitter, NotificationKind};
pub use payment_gateway::{
    CancelRequest, ConfirmRequest, GatewayCancellation, GatewayConfirmation, GatewayError,
    GatewayErrorCode, GatewayPaymentStatus, PaymentGateway,
};
pub use payment_repository::{
    PaymentFailure, PaymentRepository, PaymentReversal, PaymentSettlement, TransitionOutcome,
};
pub use reservation_reader::{Page, ReservationReader, ReservationSummary};
pub use reservation_store::{AdvisorProfile, InsertOutcome, ReservationStore};
