//! PostgreSQL implementation of PaymentRepository.
//!
//! Confirm and cancel can race on the same payment row, so every
//! transition takes the row with `SELECT ... FOR UPDATE`, re-checks the
//! status it found, and updates inside the same transaction. The outcome
//! reports what the lock observed instead of overwriting blindly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ReservationId, Timestamp};
use crate::domain::payment::{OrderId, Payment, PaymentStatus};
use crate::ports::{
    PaymentFailure, PaymentRepository, PaymentReversal, PaymentSettlement, TransitionOutcome,
};

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new PostgresPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the payment row and returns its current status.
    async fn lock_status(
        tx: &mut Transaction<'_, Postgres>,
        order_id: &OrderId,
    ) -> Result<PaymentStatus, DomainError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM payments WHERE order_id = $1 FOR UPDATE")
                .bind(order_id.as_str())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| db_error("Failed to lock payment", e))?;

        match status {
            Some(s) => parse_status(&s),
            None => Err(DomainError::new(
                ErrorCode::ReservationNotFound,
                format!("No payment found for order {}", order_id),
            )),
        }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    order_id: String,
    reservation_id: Uuid,
    amount: i64,
    status: String,
    payment_key: Option<String>,
    method: Option<String>,
    receipt_url: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
    failure_code: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            order_id: OrderId::new(row.order_id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            amount: row.amount,
            status: parse_status(&row.status)?,
            payment_key: row.payment_key,
            method: row.method,
            receipt_url: row.receipt_url,
            approved_at: row.approved_at.map(Timestamp::from_datetime),
            canceled_at: row.canceled_at.map(Timestamp::from_datetime),
            cancel_reason: row.cancel_reason,
            failure_code: row.failure_code,
            failure_reason: row.failure_reason,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "cancelled" => Ok(PaymentStatus::Cancelled),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Cancelled => "cancelled",
        PaymentStatus::Failed => "failed",
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_PAYMENT: &str = r#"
    SELECT order_id, reservation_id, amount, status, payment_key, method,
           receipt_url, approved_at, canceled_at, cancel_reason,
           failure_code, failure_reason, created_at, updated_at
    FROM payments
"#;

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE order_id = $1", SELECT_PAYMENT))
                .bind(order_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE reservation_id = $1", SELECT_PAYMENT))
                .bind(reservation_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn mark_paid(
        &self,
        order_id: &OrderId,
        settlement: &PaymentSettlement,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        match Self::lock_status(&mut tx, order_id).await? {
            PaymentStatus::Paid => return Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Pending => {}
            other => return Ok(TransitionOutcome::InvalidState(other)),
        }

        sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                payment_key = $3,
                method = $4,
                receipt_url = $5,
                approved_at = $6,
                updated_at = $6
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .bind(status_to_string(&PaymentStatus::Paid))
        .bind(&settlement.payment_key)
        .bind(&settlement.method)
        .bind(&settlement.receipt_url)
        .bind(settlement.approved_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to mark payment paid", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit payment settlement", e))?;

        Ok(TransitionOutcome::Applied)
    }

    async fn mark_failed(
        &self,
        order_id: &OrderId,
        failure: &PaymentFailure,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        match Self::lock_status(&mut tx, order_id).await? {
            PaymentStatus::Failed => return Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Pending => {}
            other => return Ok(TransitionOutcome::InvalidState(other)),
        }

        sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                failure_code = $3,
                failure_reason = $4,
                updated_at = $5
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .bind(status_to_string(&PaymentStatus::Failed))
        .bind(&failure.code)
        .bind(&failure.reason)
        .bind(failure.failed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to mark payment failed", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit payment failure", e))?;

        Ok(TransitionOutcome::Applied)
    }

    async fn mark_cancelled(
        &self,
        order_id: &OrderId,
        reversal: &PaymentReversal,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        match Self::lock_status(&mut tx, order_id).await? {
            PaymentStatus::Cancelled => return Ok(TransitionOutcome::AlreadyApplied),
            PaymentStatus::Paid => {}
            other => return Ok(TransitionOutcome::InvalidState(other)),
        }

        sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                cancel_reason = $3,
                canceled_at = $4,
                updated_at = $4
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .bind(status_to_string(&PaymentStatus::Cancelled))
        .bind(&reversal.reason)
        .bind(reversal.canceled_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to mark payment cancelled", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit payment reversal", e))?;

        Ok(TransitionOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("pending").unwrap(), PaymentStatus::Pending);
        assert_eq!(parse_status("paid").unwrap(), PaymentStatus::Paid);
        assert_eq!(parse_status("cancelled").unwrap(), PaymentStatus::Cancelled);
        assert_eq!(parse_status("failed").unwrap(), PaymentStatus::Failed);
    }

    #[test]
    fn parse_status_rejects_invalid_values() {
        assert!(parse_status("canceled").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Cancelled,
            PaymentStatus::Failed,
        ] {
            let s = status_to_string(&status);
            assert_eq!(parse_status(s).unwrap(), status);
        }
    }
}
