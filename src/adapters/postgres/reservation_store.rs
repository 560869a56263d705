//! PostgreSQL implementation of ReservationStore.
//!
//! The active-slot invariant lives in the partial unique index
//! `uq_reservations_active_slot` on (advisor_id, slot_date, start_time)
//! scoped to non-canceled rows; `insert_if_absent` translates a violation
//! of that index into `SlotTaken` instead of surfacing a database error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ReservationId, Timestamp, UserId};
use crate::domain::payment::Payment;
use crate::domain::reservation::{
    CancelReason, CancellationRecord, Reservation, ReservationStatus, Slot,
};
use crate::ports::{AdvisorProfile, InsertOutcome, ReservationStore};

/// Name of the partial unique index guarding the active slot.
const ACTIVE_SLOT_CONSTRAINT: &str = "uq_reservations_active_slot";

/// PostgreSQL implementation of the ReservationStore port.
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgresReservationStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a reservation.
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    client_id: Uuid,
    advisor_id: Uuid,
    slot_date: NaiveDate,
    start_time: NaiveTime,
    message: String,
    status: String,
    cancel_actor_id: Option<Uuid>,
    cancel_reason: Option<String>,
    cancel_memo: Option<String>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DomainError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let cancellation = match (row.cancel_actor_id, row.cancel_reason, row.canceled_at) {
            (Some(actor_id), Some(reason), Some(canceled_at)) => Some(CancellationRecord::new(
                UserId::from_uuid(actor_id),
                parse_cancel_reason(&reason)?,
                row.cancel_memo.unwrap_or_default(),
                Timestamp::from_datetime(canceled_at),
            )),
            _ => None,
        };

        Ok(Reservation {
            id: ReservationId::from_uuid(row.id),
            client_id: UserId::from_uuid(row.client_id),
            advisor_id: UserId::from_uuid(row.advisor_id),
            slot: Slot::new(row.slot_date, row.start_time),
            message: row.message,
            status,
            cancellation,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<ReservationStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(ReservationStatus::Pending),
        "approved" => Ok(ReservationStatus::Approved),
        "canceled" => Ok(ReservationStatus::Canceled),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid reservation status value: {}", s),
        )),
    }
}

fn status_to_string(status: &ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Pending => "pending",
        ReservationStatus::Approved => "approved",
        ReservationStatus::Canceled => "canceled",
    }
}

fn parse_cancel_reason(s: &str) -> Result<CancelReason, DomainError> {
    CancelReason::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid cancel reason value: {}", s),
        )
    })
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn is_active_slot_conflict(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.constraint() == Some(ACTIVE_SLOT_CONSTRAINT))
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn approved_advisor(
        &self,
        advisor_id: UserId,
    ) -> Result<Option<AdvisorProfile>, DomainError> {
        let row: Option<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT u.id, u.display_name, a.consultation_fee
            FROM advisors a
            JOIN users u ON u.id = a.user_id
            WHERE a.user_id = $1 AND a.approved
            "#,
        )
        .bind(advisor_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load advisor", e))?;

        Ok(row.map(|(id, display_name, consultation_fee)| AdvisorProfile {
            advisor_id: UserId::from_uuid(id),
            display_name,
            consultation_fee,
        }))
    }

    async fn is_time_blocked(&self, advisor_id: UserId, slot: &Slot) -> Result<bool, DomainError> {
        // Half-open interval overlap against the one-hour slot.
        let blocked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM advisor_blocked_intervals
                WHERE advisor_id = $1
                  AND slot_date = $2
                  AND start_time < $4
                  AND end_time > $3
            )
            "#,
        )
        .bind(advisor_id.as_uuid())
        .bind(slot.date)
        .bind(slot.start)
        .bind(slot.end())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check blocked intervals", e))?;

        Ok(blocked)
    }

    async fn conflict_exists(&self, advisor_id: UserId, slot: &Slot) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE advisor_id = $1
                  AND slot_date = $2
                  AND start_time = $3
                  AND status <> 'canceled'
            )
            "#,
        )
        .bind(advisor_id.as_uuid())
        .bind(slot.date)
        .bind(slot.start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check slot conflict", e))?;

        Ok(exists)
    }

    async fn insert_if_absent(
        &self,
        reservation: &Reservation,
        payment: &Payment,
    ) -> Result<InsertOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO reservations (
                id, client_id, advisor_id, slot_date, start_time, end_time,
                message, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.client_id.as_uuid())
        .bind(reservation.advisor_id.as_uuid())
        .bind(reservation.slot.date)
        .bind(reservation.slot.start)
        .bind(reservation.slot.end())
        .bind(&reservation.message)
        .bind(status_to_string(&reservation.status))
        .bind(reservation.created_at.as_datetime())
        .bind(reservation.updated_at.as_datetime())
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_active_slot_conflict(&e) {
                // Transaction rolls back on drop; nothing was written.
                return Ok(InsertOutcome::SlotTaken);
            }
            return Err(db_error("Failed to insert reservation", e));
        }

        sqlx::query(
            r#"
            INSERT INTO payments (
                order_id, reservation_id, amount, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payment.order_id.as_str())
        .bind(payment.reservation_id.as_uuid())
        .bind(payment.amount)
        .bind("pending")
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert payment", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit booking", e))?;

        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, advisor_id, slot_date, start_time, message, status,
                   cancel_actor_id, cancel_reason, cancel_memo, canceled_at,
                   created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find reservation", e))?;

        row.map(Reservation::try_from).transpose()
    }

    async fn mark_canceled(
        &self,
        id: ReservationId,
        record: &CancellationRecord,
    ) -> Result<(), DomainError> {
        // Guarded on the row still being pending so the record is written
        // exactly once even under concurrent cancel attempts.
        let result = sqlx::query(
            r#"
            UPDATE reservations SET
                status = 'canceled',
                cancel_actor_id = $2,
                cancel_reason = $3,
                cancel_memo = $4,
                canceled_at = $5,
                updated_at = $5
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.actor_id.as_uuid())
        .bind(record.reason.as_str())
        .bind(&record.memo)
        .bind(record.canceled_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to cancel reservation", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Reservation is no longer cancelable",
            ));
        }

        Ok(())
    }

    async fn display_name(&self, user_id: UserId) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar("SELECT display_name FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load display name", e))
    }
}
