//! HTTP adapter - thin axum controllers over the command handlers.
//!
//! Transport is deliberately minimal: requests carry the acting user in
//! headers (real authentication lives outside this core), and every
//! domain error maps to a stable code + message body.

mod dto;
mod error;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use error::ApiError;
pub use handlers::{ActingUser, AppState};
pub use routes::api_routes;
