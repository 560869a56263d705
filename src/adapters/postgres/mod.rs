//! PostgreSQL adapters.
//!
//! Row structs convert into aggregates via `TryFrom`; status columns are
//! plain text validated on read. Constraint names are inspected to
//! translate slot conflicts into their domain meaning.

mod payment_repository;
mod reservation_reader;
mod reservation_store;

pub use payment_repository::PostgresPaymentRepository;
pub use reservation_reader::PostgresReservationReader;
pub use reservation_store::PostgresReservationStore;
