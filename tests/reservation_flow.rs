//! End-to-end scenario tests for the reservation-payment core.
//!
//! These tests verify the orchestration flows the platform is built
//! around:
//! 1. Book a slot, confirm its payment, list the result
//! 2. Concurrent bookings for one slot admit exactly one winner
//! 3. Paid cancellation reverses the payment before the reservation
//! 4. A failed reversal leaves both rows untouched
//!
//! Uses in-memory implementations to exercise the handlers without
//! external dependencies; the constrained-insert semantics of the real
//! store are emulated with a slot set behind one mutex.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use advisorly::adapters::toss::MockGateway;
use advisorly::adapters::InMemoryNotificationEmitter;
use advisorly::application::handlers::{
    CancelPaymentHandler, CancelReservationCommand, CancelReservationHandler,
    ConfirmPaymentCommand, ConfirmPaymentHandler, CreateReservationCommand,
    CreateReservationHandler, ListReservationsCommand, ListReservationsHandler,
};
use advisorly::domain::foundation::{Actor, ActorRole, DomainError, ReservationId, Timestamp, UserId};
use advisorly::domain::payment::{OrderId, Payment, PaymentError, PaymentStatus};
use advisorly::domain::reservation::{
    CancelReason, CancellationRecord, Reservation, ReservationError, ReservationStatus, Slot,
};
use advisorly::ports::{
    AdvisorProfile, Clock, GatewayError, InsertOutcome, Page, PaymentFailure, PaymentRepository,
    PaymentReversal, PaymentSettlement, ReservationReader, ReservationStore, ReservationSummary,
    TransitionOutcome,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Shared mutable world backing every in-memory port.
#[derive(Default)]
struct World {
    advisors: HashMap<UserId, AdvisorProfile>,
    names: HashMap<UserId, String>,
    active_slots: HashSet<(UserId, NaiveDate, NaiveTime)>,
    reservations: HashMap<ReservationId, Reservation>,
    payments: HashMap<String, Payment>,
}

/// In-memory store emulating the partial unique index with a slot set.
struct TestStore {
    world: Arc<Mutex<World>>,
}

#[async_trait]
impl ReservationStore for TestStore {
    async fn approved_advisor(
        &self,
        advisor_id: UserId,
    ) -> Result<Option<AdvisorProfile>, DomainError> {
        Ok(self.world.lock().unwrap().advisors.get(&advisor_id).cloned())
    }

    async fn is_time_blocked(&self, _advisor_id: UserId, _slot: &Slot) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn conflict_exists(&self, advisor_id: UserId, slot: &Slot) -> Result<bool, DomainError> {
        let world = self.world.lock().unwrap();
        Ok(world.active_slots.contains(&(advisor_id, slot.date, slot.start)))
    }

    async fn insert_if_absent(
        &self,
        reservation: &Reservation,
        payment: &Payment,
    ) -> Result<InsertOutcome, DomainError> {
        let mut world = self.world.lock().unwrap();
        let key = (reservation.advisor_id, reservation.slot.date, reservation.slot.start);
        if !world.active_slots.insert(key) {
            return Ok(InsertOutcome::SlotTaken);
        }
        world.reservations.insert(reservation.id, reservation.clone());
        world
            .payments
            .insert(payment.order_id.as_str().to_string(), payment.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError> {
        Ok(self.world.lock().unwrap().reservations.get(&id).cloned())
    }

    async fn mark_canceled(
        &self,
        id: ReservationId,
        record: &CancellationRecord,
    ) -> Result<(), DomainError> {
        let mut world = self.world.lock().unwrap();
        let reservation = world.reservations.get_mut(&id).expect("reservation exists");
        reservation.cancel(record.clone()).map_err(DomainError::from)?;
        let key = (reservation.advisor_id, reservation.slot.date, reservation.slot.start);
        world.active_slots.remove(&key);
        Ok(())
    }

    async fn display_name(&self, user_id: UserId) -> Result<Option<String>, DomainError> {
        Ok(self.world.lock().unwrap().names.get(&user_id).cloned())
    }
}

/// In-memory payment repository with the same guarded transitions the
/// row-locking Postgres implementation provides.
struct TestPayments {
    world: Arc<Mutex<World>>,
}

#[async_trait]
impl PaymentRepository for TestPayments {
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError> {
        Ok(self.world.lock().unwrap().payments.get(order_id.as_str()).cloned())
    }

    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .world
            .lock()
            .unwrap()
            .payments
            .values()
            .find(|p| p.reservation_id == reservation_id)
            .cloned())
    }

    async fn mark_paid(
        &self,
        order_id: &OrderId,
        settlement: &PaymentSettlement,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut world = self.world.lock().unwrap();
        let payment = world.payments.get_mut(order_id.as_str()).expect("payment exists");
        match payment.status {
            PaymentStatus::Paid => Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Pending => {
                payment
                    .confirm(
                        settlement.payment_key.clone(),
                        settlement.method.clone(),
                        settlement.receipt_url.clone(),
                        settlement.approved_at,
                    )
                    .expect("pending can settle");
                Ok(TransitionOutcome::Applied)
            }
            other => Ok(TransitionOutcome::InvalidState(other)),
        }
    }

    async fn mark_failed(
        &self,
        order_id: &OrderId,
        failure: &PaymentFailure,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut world = self.world.lock().unwrap();
        let payment = world.payments.get_mut(order_id.as_str()).expect("payment exists");
        match payment.status {
            PaymentStatus::Failed => Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Pending => {
                payment
                    .fail(failure.code.clone(), failure.reason.clone(), failure.failed_at)
                    .expect("pending can fail");
                Ok(TransitionOutcome::Applied)
            }
            other => Ok(TransitionOutcome::InvalidState(other)),
        }
    }

    async fn mark_cancelled(
        &self,
        order_id: &OrderId,
        reversal: &PaymentReversal,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut world = self.world.lock().unwrap();
        let payment = world.payments.get_mut(order_id.as_str()).expect("payment exists");
        match payment.status {
            PaymentStatus::Cancelled => Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Paid => {
                payment
                    .cancel(reversal.reason.clone(), reversal.canceled_at)
                    .expect("paid can cancel");
                Ok(TransitionOutcome::Applied)
            }
            other => Ok(TransitionOutcome::InvalidState(other)),
        }
    }
}

/// Read side over the shared world.
struct TestReader {
    world: Arc<Mutex<World>>,
}

#[async_trait]
impl ReservationReader for TestReader {
    async fn list_for_actor(
        &self,
        actor_id: UserId,
        role: ActorRole,
        _page: Page,
    ) -> Result<Vec<ReservationSummary>, DomainError> {
        let world = self.world.lock().unwrap();
        let mut rows = Vec::new();
        for reservation in world.reservations.values() {
            let (mine, counterparty) = match role {
                ActorRole::Client => (reservation.client_id, reservation.advisor_id),
                ActorRole::Advisor => (reservation.advisor_id, reservation.client_id),
            };
            if mine != actor_id {
                continue;
            }
            let payment = world
                .payments
                .values()
                .find(|p| p.reservation_id == reservation.id)
                .expect("every reservation has a payment");
            rows.push(ReservationSummary {
                reservation_id: reservation.id,
                counterparty_name: world
                    .names
                    .get(&counterparty)
                    .cloned()
                    .unwrap_or_else(|| counterparty.to_string()),
                date: reservation.slot.date,
                start_time: reservation.slot.start,
                reservation_status: reservation.status,
                payment_status: payment.status,
            });
        }
        Ok(rows)
    }
}

struct FixedClock(Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// =============================================================================
// Fixture
// =============================================================================

struct Platform {
    world: Arc<Mutex<World>>,
    gateway: Arc<MockGateway>,
    notifications: Arc<InMemoryNotificationEmitter>,
    create: CreateReservationHandler,
    confirm: ConfirmPaymentHandler,
    cancel: CancelReservationHandler,
    list: ListReservationsHandler,
    client: Actor,
    advisor_id: UserId,
}

impl Platform {
    /// Today is Monday 2025-07-28; one approved advisor charging 50 000.
    fn new() -> Self {
        let client_id = UserId::new();
        let advisor_id = UserId::new();

        let mut world = World::default();
        world.advisors.insert(
            advisor_id,
            AdvisorProfile {
                advisor_id,
                display_name: "Dana Advisor".to_string(),
                consultation_fee: 50_000,
            },
        );
        world.names.insert(advisor_id, "Dana Advisor".to_string());
        world.names.insert(client_id, "Casey Client".to_string());
        let world = Arc::new(Mutex::new(world));

        let dt = DateTime::parse_from_rfc3339("2025-07-28T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = Arc::new(FixedClock(Timestamp::from_datetime(dt)));

        let store = Arc::new(TestStore { world: world.clone() });
        let payments = Arc::new(TestPayments { world: world.clone() });
        let reader = Arc::new(TestReader { world: world.clone() });
        let gateway = Arc::new(MockGateway::new());
        let notifications = Arc::new(InMemoryNotificationEmitter::new());

        let payment_canceler =
            Arc::new(CancelPaymentHandler::new(payments.clone(), gateway.clone()));

        Self {
            world,
            gateway: gateway.clone(),
            notifications: notifications.clone(),
            create: CreateReservationHandler::new(
                store.clone(),
                notifications.clone(),
                clock.clone(),
            ),
            confirm: ConfirmPaymentHandler::new(payments.clone(), gateway.clone(), clock.clone()),
            cancel: CancelReservationHandler::new(
                store,
                payments,
                payment_canceler,
                notifications,
                clock,
            ),
            list: ListReservationsHandler::new(reader),
            client: Actor::client(client_id),
            advisor_id,
        }
    }

    fn booking_command(&self) -> CreateReservationCommand {
        CreateReservationCommand {
            actor: self.client,
            advisor_id: self.advisor_id,
            date: NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            message: "Portfolio review please".to_string(),
        }
    }

    fn reservation_status(&self, id: ReservationId) -> ReservationStatus {
        self.world.lock().unwrap().reservations[&id].status
    }

    fn payment_status(&self, order_id: &OrderId) -> PaymentStatus {
        self.world.lock().unwrap().payments[order_id.as_str()].status
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn happy_path_book_confirm_list() {
    let platform = Platform::new();

    // Book Wednesday 2025-07-30 14:00.
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();
    assert_eq!(booking.amount, 50_000);
    assert_eq!(platform.reservation_status(booking.reservation_id), ReservationStatus::Pending);
    assert_eq!(platform.payment_status(&booking.order_id), PaymentStatus::Pending);

    // Confirm with the matching amount.
    let confirmation = platform
        .confirm
        .handle(ConfirmPaymentCommand {
            order_id: booking.order_id.clone(),
            payment_key: "pay_key_123".to_string(),
            amount: booking.amount,
        })
        .await
        .unwrap();
    assert_eq!(confirmation.status, PaymentStatus::Paid);
    assert_eq!(platform.payment_status(&booking.order_id), PaymentStatus::Paid);

    // The client's listing shows one paid entry with the advisor's name.
    let rows = platform
        .list
        .handle(ListReservationsCommand {
            actor: platform.client,
            page: Page::default(),
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].counterparty_name, "Dana Advisor");
    assert_eq!(rows[0].payment_status, PaymentStatus::Paid);
    assert_eq!(rows[0].reservation_status, ReservationStatus::Pending);
}

#[tokio::test]
async fn concurrent_bookings_admit_exactly_one_winner() {
    let platform = Arc::new(Platform::new());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let platform = platform.clone();
        tasks.push(tokio::spawn(async move {
            let mut cmd = platform.booking_command();
            cmd.actor = Actor::client(UserId::new());
            platform.create.handle(cmd).await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(ReservationError::TimeSlotAlreadyReserved) => conflicts += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn same_day_booking_writes_nothing() {
    let platform = Platform::new();

    let mut cmd = platform.booking_command();
    cmd.date = NaiveDate::from_ymd_opt(2025, 7, 28).unwrap(); // today

    let result = platform.create.handle(cmd).await;
    assert!(matches!(result, Err(ReservationError::SameDayReservationNotAllowed)));

    let world = platform.world.lock().unwrap();
    assert!(world.reservations.is_empty());
    assert!(world.payments.is_empty());
}

#[tokio::test]
async fn confirm_is_idempotent_and_keeps_the_first_approval() {
    let platform = Platform::new();
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();

    let cmd = ConfirmPaymentCommand {
        order_id: booking.order_id.clone(),
        payment_key: "pay_key_123".to_string(),
        amount: booking.amount,
    };
    let first = platform.confirm.handle(cmd.clone()).await.unwrap();
    let second = platform.confirm.handle(cmd).await.unwrap();

    assert_eq!(first.approved_at, second.approved_at);
    // One gateway call total; the retry short-circuits on the guard.
    assert_eq!(platform.gateway.confirm_calls().len(), 1);
}

#[tokio::test]
async fn failed_confirm_leaves_reservation_for_later_cleanup() {
    let platform = Platform::new();
    platform.gateway.set_confirm_error(GatewayError::timeout("deadline exceeded"));

    let booking = platform.create.handle(platform.booking_command()).await.unwrap();
    let result = platform
        .confirm
        .handle(ConfirmPaymentCommand {
            order_id: booking.order_id.clone(),
            payment_key: "pay_key_123".to_string(),
            amount: booking.amount,
        })
        .await;

    assert!(matches!(result, Err(PaymentError::ConfirmFailed { .. })));
    assert_eq!(platform.payment_status(&booking.order_id), PaymentStatus::Failed);
    // The reservation is not deleted; cancellation can clean it up.
    assert_eq!(platform.reservation_status(booking.reservation_id), ReservationStatus::Pending);

    let cancel = platform
        .cancel
        .handle(CancelReservationCommand {
            actor: platform.client,
            reservation_id: booking.reservation_id,
            reason: CancelReason::NoLongerNeeded,
            memo: String::new(),
        })
        .await;
    assert!(cancel.is_ok());
    assert_eq!(platform.reservation_status(booking.reservation_id), ReservationStatus::Canceled);
}

#[tokio::test]
async fn paid_cancellation_reverses_payment_and_notifies_the_advisor() {
    let platform = Platform::new();
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();
    platform
        .confirm
        .handle(ConfirmPaymentCommand {
            order_id: booking.order_id.clone(),
            payment_key: "pay_key_123".to_string(),
            amount: booking.amount,
        })
        .await
        .unwrap();
    platform.notifications.drain();

    let result = platform
        .cancel
        .handle(CancelReservationCommand {
            actor: platform.client,
            reservation_id: booking.reservation_id,
            reason: CancelReason::ScheduleConflict,
            memo: "Something came up".to_string(),
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(platform.payment_status(&booking.order_id), PaymentStatus::Cancelled);
    assert_eq!(platform.reservation_status(booking.reservation_id), ReservationStatus::Canceled);

    // Gateway got the full amount.
    let cancel_calls = platform.gateway.cancel_calls();
    assert_eq!(cancel_calls.len(), 1);
    assert_eq!(cancel_calls[0].1.amount, Some(50_000));

    // The advisor heard about it, with the client's display name.
    let published = platform.notifications.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].target_user_id, platform.advisor_id);
    assert_eq!(published[0].payload["canceled_by"], "Casey Client");
}

#[tokio::test]
async fn failed_reversal_changes_nothing() {
    let platform = Platform::new();
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();
    platform
        .confirm
        .handle(ConfirmPaymentCommand {
            order_id: booking.order_id.clone(),
            payment_key: "pay_key_123".to_string(),
            amount: booking.amount,
        })
        .await
        .unwrap();
    platform.gateway.set_cancel_error(GatewayError::network("connection reset"));

    let result = platform
        .cancel
        .handle(CancelReservationCommand {
            actor: platform.client,
            reservation_id: booking.reservation_id,
            reason: CancelReason::ScheduleConflict,
            memo: String::new(),
        })
        .await;

    assert!(matches!(result, Err(ReservationError::Payment(_))));
    assert_eq!(platform.payment_status(&booking.order_id), PaymentStatus::Paid);
    assert_eq!(platform.reservation_status(booking.reservation_id), ReservationStatus::Pending);
}

#[tokio::test]
async fn cancellation_is_guarded_against_repeats() {
    let platform = Platform::new();
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();

    let cmd = CancelReservationCommand {
        actor: platform.client,
        reservation_id: booking.reservation_id,
        reason: CancelReason::NoLongerNeeded,
        memo: String::new(),
    };
    platform.cancel.handle(cmd.clone()).await.unwrap();
    let second = platform.cancel.handle(cmd).await;

    assert!(matches!(second, Err(ReservationError::AlreadyCanceled(_))));
}

#[tokio::test]
async fn canceled_slot_can_be_rebooked() {
    let platform = Platform::new();
    let booking = platform.create.handle(platform.booking_command()).await.unwrap();
    platform
        .cancel
        .handle(CancelReservationCommand {
            actor: platform.client,
            reservation_id: booking.reservation_id,
            reason: CancelReason::BookedByMistake,
            memo: String::new(),
        })
        .await
        .unwrap();

    // The unique index only covers non-canceled rows, so the slot is free.
    let mut cmd = platform.booking_command();
    cmd.actor = Actor::client(UserId::new());
    let rebooked = platform.create.handle(cmd).await;
    assert!(rebooked.is_ok());
}
