//! Axum router configuration for the reservation API.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Whole-request deadline; generous enough for one gateway round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

use super::handlers::{
    cancel_reservation, confirm_payment, create_reservation, list_reservations, AppState,
};

/// Create the reservation API router.
///
/// # Routes
///
/// - `POST /reservations` - book a consultation slot
/// - `GET /reservations` - list the acting user's reservations
/// - `POST /reservations/:id/cancel` - cancel a reservation
/// - `POST /payments/confirm` - gateway redirect callback
///
/// Payment cancellation has no route: it is only ever invoked by the
/// cancellation workflow.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/reservations", post(create_reservation).get(list_reservations))
        .route("/reservations/:id/cancel", post(cancel_reservation))
        .route("/payments/confirm", post(confirm_payment))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
