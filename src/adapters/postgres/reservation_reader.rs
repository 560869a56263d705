//! PostgreSQL implementation of ReservationReader.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{ActorRole, DomainError, ErrorCode, ReservationId, UserId};
use crate::domain::payment::PaymentStatus;
use crate::domain::reservation::ReservationStatus;
use crate::ports::{Page, ReservationReader, ReservationSummary};

/// PostgreSQL implementation of the ReservationReader port.
pub struct PostgresReservationReader {
    pool: PgPool,
}

impl PostgresReservationReader {
    /// Creates a new PostgresReservationReader with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    counterparty_name: String,
    slot_date: NaiveDate,
    start_time: NaiveTime,
    reservation_status: String,
    payment_status: String,
}

impl TryFrom<SummaryRow> for ReservationSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let reservation_status = parse_reservation_status(&row.reservation_status)?;
        let payment_status = parse_payment_status(&row.payment_status)?;

        Ok(ReservationSummary {
            reservation_id: ReservationId::from_uuid(row.id),
            counterparty_name: row.counterparty_name,
            date: row.slot_date,
            start_time: row.start_time,
            reservation_status,
            payment_status,
        })
    }
}

fn invalid_status(s: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid status value: {}", s),
    )
}

fn parse_reservation_status(s: &str) -> Result<ReservationStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(ReservationStatus::Pending),
        "approved" => Ok(ReservationStatus::Approved),
        "canceled" => Ok(ReservationStatus::Canceled),
        _ => Err(invalid_status(s)),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "cancelled" => Ok(PaymentStatus::Cancelled),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(invalid_status(s)),
    }
}

#[async_trait]
impl ReservationReader for PostgresReservationReader {
    async fn list_for_actor(
        &self,
        actor_id: UserId,
        role: ActorRole,
        page: Page,
    ) -> Result<Vec<ReservationSummary>, DomainError> {
        // Clients see the advisor's name and vice versa.
        let sql = match role {
            ActorRole::Client => {
                r#"
                SELECT r.id, u.display_name AS counterparty_name,
                       r.slot_date, r.start_time,
                       r.status AS reservation_status, p.status AS payment_status
                FROM reservations r
                JOIN payments p ON p.reservation_id = r.id
                JOIN users u ON u.id = r.advisor_id
                WHERE r.client_id = $1
                ORDER BY r.slot_date DESC, r.start_time DESC
                LIMIT $2 OFFSET $3
                "#
            }
            ActorRole::Advisor => {
                r#"
                SELECT r.id, u.display_name AS counterparty_name,
                       r.slot_date, r.start_time,
                       r.status AS reservation_status, p.status AS payment_status
                FROM reservations r
                JOIN payments p ON p.reservation_id = r.id
                JOIN users u ON u.id = r.client_id
                WHERE r.advisor_id = $1
                ORDER BY r.slot_date DESC, r.start_time DESC
                LIMIT $2 OFFSET $3
                "#
            }
        };

        let rows: Vec<SummaryRow> = sqlx::query_as(sql)
            .bind(actor_id.as_uuid())
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to list reservations: {}", e),
                )
            })?;

        rows.into_iter().map(ReservationSummary::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_status_columns() {
        assert_eq!(parse_reservation_status("approved").unwrap(), ReservationStatus::Approved);
        assert_eq!(parse_payment_status("cancelled").unwrap(), PaymentStatus::Cancelled);
    }

    #[test]
    fn rejects_mixed_up_spellings() {
        // Reservation side spells it "canceled", payment side "cancelled".
        assert!(parse_reservation_status("cancelled").is_err());
        assert!(parse_payment_status("canceled").is_err());
    }
}
