//! Command handlers for the reservation-payment core.
//!
//! One handler per boundary operation. Handlers take explicit actor
//! parameters, speak to the outside world only through ports, and return
//! domain errors that callers can branch on.

mod cancel_payment;
mod cancel_reservation;
mod confirm_payment;
mod create_reservation;
mod list_reservations;

pub use cancel_payment::{CancelPaymentCommand, CancelPaymentHandler, CancelPaymentResult};
pub use cancel_reservation::{
    CancelReservationCommand, CancelReservationHandler, CancelReservationResult,
};
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use create_reservation::{
    CreateReservationCommand, CreateReservationHandler, CreateReservationResult,
};
pub use list_reservations::{ListReservationsCommand, ListReservationsHandler};
