//! HTTP handlers for the reservation API.
//!
//! These handlers connect axum routes to application layer command handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::{
    CancelPaymentHandler, CancelReservationCommand, CancelReservationHandler,
    ConfirmPaymentCommand, ConfirmPaymentHandler, CreateReservationCommand,
    CreateReservationHandler, ListReservationsCommand, ListReservationsHandler,
};
use crate::domain::foundation::{Actor, ActorRole, ReservationId, UserId};
use crate::domain::payment::OrderId;
use crate::ports::{
    Clock, NotificationEmitter, Page, PaymentGateway, PaymentRepository, ReservationReader,
    ReservationStore,
};

use super::dto::{
    CancelReservationRequest, CancelReservationResponse, ConfirmPaymentRequest,
    ConfirmPaymentResponse, CreateReservationRequest, CreateReservationResponse, ErrorResponse,
    ListReservationsQuery, ListReservationsResponse,
};
use super::error::ApiError;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; handlers are built on demand from the Arc-wrapped
/// ports.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReservationStore>,
    pub payments: Arc<dyn PaymentRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub reader: Arc<dyn ReservationReader>,
    pub notifications: Arc<dyn NotificationEmitter>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn create_reservation_handler(&self) -> CreateReservationHandler {
        CreateReservationHandler::new(
            self.store.clone(),
            self.notifications.clone(),
            self.clock.clone(),
        )
    }

    pub fn confirm_payment_handler(&self) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(self.payments.clone(), self.gateway.clone(), self.clock.clone())
    }

    pub fn cancel_payment_handler(&self) -> CancelPaymentHandler {
        CancelPaymentHandler::new(self.payments.clone(), self.gateway.clone())
    }

    pub fn cancel_reservation_handler(&self) -> CancelReservationHandler {
        CancelReservationHandler::new(
            self.store.clone(),
            self.payments.clone(),
            Arc::new(self.cancel_payment_handler()),
            self.notifications.clone(),
            self.clock.clone(),
        )
    }

    pub fn list_reservations_handler(&self) -> ListReservationsHandler {
        ListReservationsHandler::new(self.reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Acting User (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Acting user extracted from request headers.
///
/// Real authentication is outside this core; the `X-User-Id` and
/// `X-User-Role` headers stand in for whatever the auth layer injects.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub Actor);

/// Rejection type for ActingUser extraction.
pub struct IdentityRequired;

impl IntoResponse for IdentityRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new(
            "IDENTITY_REQUIRED",
            "X-User-Id and X-User-Role headers are required",
        );
        (axum::http::StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = IdentityRequired;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<UserId>().ok())
            .ok_or(IdentityRequired)?;
        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
            .and_then(ActorRole::parse)
            .ok_or(IdentityRequired)?;

        Ok(ActingUser(Actor::new(user_id, role)))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /reservations - Book a consultation slot
pub async fn create_reservation(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_reservation_handler();
    let cmd = CreateReservationCommand {
        actor,
        advisor_id: UserId::from_uuid(request.advisor_id),
        date: request.date,
        start_time: request.start_time,
        message: request.message,
    };

    let result = handler.handle(cmd).await?;
    Ok(Json(CreateReservationResponse::from(result)))
}

/// POST /payments/confirm - Settle a payment after gateway checkout
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.confirm_payment_handler();
    let cmd = ConfirmPaymentCommand {
        order_id: OrderId::new(request.order_id),
        payment_key: request.payment_key,
        amount: request.amount,
    };

    let result = handler.handle(cmd).await?;
    Ok(Json(ConfirmPaymentResponse::from(result)))
}

/// POST /reservations/{id}/cancel - Cancel a reservation
pub async fn cancel_reservation(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<CancelReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancel_reservation_handler();
    let cmd = CancelReservationCommand {
        actor,
        reservation_id: ReservationId::from_uuid(reservation_id),
        reason: request.reason,
        memo: request.memo,
    };

    let result = handler.handle(cmd).await?;
    Ok(Json(CancelReservationResponse::from(result)))
}

/// GET /reservations - List the acting user's reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Query(query): Query<ListReservationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_reservations_handler();
    let cmd = ListReservationsCommand {
        actor,
        page: Page::new(query.page, query.size.unwrap_or(Page::DEFAULT_SIZE)),
    };

    let reservations = handler.handle(cmd).await?;
    Ok(Json(ListReservationsResponse { reservations }))
}
