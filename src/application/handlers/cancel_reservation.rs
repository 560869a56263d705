//! CancelReservationHandler - state-dependent compensating workflow.
//!
//! Cancels a reservation outright while its payment is unpaid, or reverses
//! the settled payment first and only then marks the reservation canceled.
//! If the payment reversal fails the reservation is left untouched.

use std::sync::Arc;

use serde_json::json;

use crate::domain::foundation::{Actor, ReservationId, Timestamp};
use crate::domain::payment::{PaymentError, PaymentStatus};
use crate::domain::reservation::{
    CancelReason, CancellationRecord, Reservation, ReservationError,
};
use crate::ports::{
    Clock, Notification, NotificationEmitter, NotificationKind, PaymentRepository,
    ReservationStore,
};

use super::{CancelPaymentCommand, CancelPaymentHandler};

/// Command to cancel a reservation.
#[derive(Debug, Clone)]
pub struct CancelReservationCommand {
    pub actor: Actor,
    pub reservation_id: ReservationId,
    pub reason: CancelReason,
    pub memo: String,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelReservationResult {
    pub reservation_id: ReservationId,
    pub canceled_at: Timestamp,
}

/// Handler for reservation cancellation.
pub struct CancelReservationHandler {
    store: Arc<dyn ReservationStore>,
    payments: Arc<dyn PaymentRepository>,
    payment_canceler: Arc<CancelPaymentHandler>,
    notifications: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
}

impl CancelReservationHandler {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        payments: Arc<dyn PaymentRepository>,
        payment_canceler: Arc<CancelPaymentHandler>,
        notifications: Arc<dyn NotificationEmitter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            payments,
            payment_canceler,
            notifications,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelReservationCommand,
    ) -> Result<CancelReservationResult, ReservationError> {
        // 1. Load and check every precondition before touching anything.
        let reservation = self
            .store
            .find_by_id(cmd.reservation_id)
            .await?
            .ok_or(ReservationError::NotFound(cmd.reservation_id))?;

        reservation.ensure_cancelable(&cmd.actor, self.clock.now().date())?;

        // 2. The payment state decides the compensation path.
        let payment = self
            .payments
            .find_by_reservation_id(reservation.id)
            .await?
            .ok_or_else(|| {
                ReservationError::infrastructure("reservation has no payment row")
            })?;

        if payment.status == PaymentStatus::Paid {
            // Reverse the money first; only a confirmed reversal may be
            // followed by the reservation transition.
            self.payment_canceler
                .handle(CancelPaymentCommand {
                    order_id: payment.order_id.clone(),
                    reason: cmd.reason.label().to_string(),
                    amount: None,
                })
                .await
                .map_err(|err| self.payment_cancel_failed(&reservation, err))?;
        }
        // Pending, Failed, or Cancelled payments need no compensation; the
        // reservation row alone is canceled.

        // 3. Commit the reservation transition with its record.
        let record = CancellationRecord::new(
            cmd.actor.id,
            cmd.reason,
            cmd.memo.clone(),
            self.clock.now(),
        );
        self.store.mark_canceled(reservation.id, &record).await?;

        tracing::info!(
            reservation_id = %reservation.id,
            actor_id = %cmd.actor.id,
            reason = cmd.reason.as_str(),
            "reservation canceled"
        );

        // 4. Best-effort notification to the other party.
        self.notify_counterparty(&reservation, &cmd).await;

        Ok(CancelReservationResult {
            reservation_id: reservation.id,
            canceled_at: record.canceled_at,
        })
    }

    fn payment_cancel_failed(
        &self,
        reservation: &Reservation,
        err: PaymentError,
    ) -> ReservationError {
        tracing::warn!(
            reservation_id = %reservation.id,
            error = %err,
            "payment reversal failed; reservation stays active"
        );
        ReservationError::Payment(err)
    }

    /// Emission failure must not roll back the cancellation; log and move on.
    async fn notify_counterparty(
        &self,
        reservation: &Reservation,
        cmd: &CancelReservationCommand,
    ) {
        let Some(target) = reservation.counterparty_of(cmd.actor.id) else {
            return;
        };
        let actor_name = match self.store.display_name(cmd.actor.id).await {
            Ok(Some(name)) => name,
            Ok(None) => cmd.actor.id.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to resolve canceling actor name");
                cmd.actor.id.to_string()
            }
        };

        let notification = Notification::new(
            target,
            NotificationKind::ReservationCanceled,
            json!({
                "reservation_id": reservation.id,
                "canceled_by": actor_name,
                "date": reservation.slot.date,
                "start_time": reservation.slot.start,
                "reason": cmd.reason.label(),
            }),
        );
        if let Err(err) = self.notifications.publish(notification).await {
            tracing::warn!(error = %err, "failed to publish cancellation notification");
        }
    }
}
