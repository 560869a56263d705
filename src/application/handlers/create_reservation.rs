//! CreateReservationHandler - Command handler for booking a slot.
//!
//! Composes the pure slot policy with the availability store: validate,
//! attempt the atomic insert, translate a storage conflict into a domain
//! conflict. The reservation and its payment row are written in one
//! transaction; no gateway call happens here.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::domain::foundation::{Actor, ReservationId, UserId};
use crate::domain::payment::{OrderId, Payment};
use crate::domain::reservation::{slot_policy, Reservation, ReservationError, Slot};
use crate::ports::{
    Clock, InsertOutcome, Notification, NotificationEmitter, NotificationKind, ReservationStore,
};

/// Command to book a consultation slot.
#[derive(Debug, Clone)]
pub struct CreateReservationCommand {
    pub actor: Actor,
    pub advisor_id: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub message: String,
}

/// Result of a successful booking: everything the client needs to invoke
/// the payment gateway checkout.
#[derive(Debug, Clone)]
pub struct CreateReservationResult {
    pub reservation_id: ReservationId,
    pub order_id: OrderId,
    pub amount: i64,

    /// Display name for the checkout page.
    pub order_name: String,

    pub advisor_name: String,
}

/// Handler for creating reservations.
pub struct CreateReservationHandler {
    store: Arc<dyn ReservationStore>,
    notifications: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
}

impl CreateReservationHandler {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        notifications: Arc<dyn NotificationEmitter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifications,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateReservationCommand,
    ) -> Result<CreateReservationResult, ReservationError> {
        let now = self.clock.now();
        let slot = Slot::new(cmd.date, cmd.start_time);

        // 1. Pure policy rules, in order, first failure wins.
        slot_policy::validate(now, &cmd.actor, cmd.advisor_id, &slot)?;

        // 2. Store-backed rules: advisor approval and blocked intervals.
        let advisor = self
            .store
            .approved_advisor(cmd.advisor_id)
            .await?
            .ok_or(ReservationError::AdvisorNotFound(cmd.advisor_id))?;

        if self.store.is_time_blocked(cmd.advisor_id, &slot).await? {
            return Err(ReservationError::TimeSlotBlocked);
        }

        // 3. Existence fast-path. A concurrent request can interleave after
        // this check; the constrained insert below is the authority.
        if self.store.conflict_exists(cmd.advisor_id, &slot).await? {
            return Err(ReservationError::TimeSlotAlreadyReserved);
        }

        // 4. Reservation and payment rows, one transaction.
        let reservation = Reservation::request(
            ReservationId::new(),
            cmd.actor.id,
            cmd.advisor_id,
            slot,
            cmd.message,
            now,
        );
        let order_id = OrderId::generate(cmd.actor.id, cmd.advisor_id, now);
        let payment = Payment::prepare(
            order_id.clone(),
            reservation.id,
            advisor.consultation_fee,
            now,
        );

        match self.store.insert_if_absent(&reservation, &payment).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::SlotTaken => return Err(ReservationError::TimeSlotAlreadyReserved),
        }

        tracing::info!(
            reservation_id = %reservation.id,
            order_id = %order_id,
            advisor_id = %cmd.advisor_id,
            slot = %slot,
            "reservation created"
        );

        // 5. Best-effort heads-up to the advisor; never fails the booking.
        let notification = Notification::new(
            cmd.advisor_id,
            NotificationKind::ReservationBooked,
            json!({
                "reservation_id": reservation.id,
                "date": slot.date,
                "start_time": slot.start,
            }),
        );
        if let Err(err) = self.notifications.publish(notification).await {
            tracing::warn!(error = %err, "failed to publish booking notification");
        }

        Ok(CreateReservationResult {
            reservation_id: reservation.id,
            order_id,
            amount: advisor.consultation_fee,
            order_name: format!("1-hour consultation with {}", advisor.display_name),
            advisor_name: advisor.display_name,
        })
    }
}
