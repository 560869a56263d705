//! Payment aggregate entity.
//!
//! Each reservation owns exactly one Payment, created together with it at
//! Pending. The aggregate enforces the monotonic status transitions; the
//! orchestrating handlers decide *when* a transition is justified by a
//! definitive gateway result.
//!
//! # Design Decisions
//!
//! - **Money as i64**: amounts are whole currency units, never floats
//! - **Gateway facts are immutable**: key, receipt, and approval time are
//!   written once on settlement and never overwritten

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ReservationId, StateMachine, Timestamp};

use super::{OrderId, PaymentError, PaymentStatus};

/// Payment aggregate - the money side of one reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Globally unique order id, the external key for the gateway.
    pub order_id: OrderId,

    /// Owning reservation (1:1).
    pub reservation_id: ReservationId,

    /// Amount due, the advisor's configured consultation fee.
    pub amount: i64,

    /// Current lifecycle status.
    pub status: PaymentStatus,

    /// Gateway payment key, set when the gateway confirms.
    pub payment_key: Option<String>,

    /// Payment method reported by the gateway (e.g. "CARD").
    pub method: Option<String>,

    /// Receipt reference reported by the gateway.
    pub receipt_url: Option<String>,

    /// When the gateway approved the payment.
    pub approved_at: Option<Timestamp>,

    /// When the payment was reversed.
    pub canceled_at: Option<Timestamp>,

    /// Reason the payment was reversed.
    pub cancel_reason: Option<String>,

    /// Failure code from the gateway or orchestrator.
    pub failure_code: Option<String>,

    /// Human-readable failure reason.
    pub failure_reason: Option<String>,

    /// When the payment row was created.
    pub created_at: Timestamp,

    /// When the payment row was last updated.
    pub updated_at: Timestamp,
}

impl Payment {
    /// Prepares a Pending payment alongside a new reservation.
    pub fn prepare(
        order_id: OrderId,
        reservation_id: ReservationId,
        amount: i64,
        now: Timestamp,
    ) -> Self {
        Self {
            order_id,
            reservation_id,
            amount,
            status: PaymentStatus::Pending,
            payment_key: None,
            method: None,
            receipt_url: None,
            approved_at: None,
            canceled_at: None,
            cancel_reason: None,
            failure_code: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the payment settled with the facts the gateway reported.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyProcessed` unless the payment is Pending.
    pub fn confirm(
        &mut self,
        payment_key: impl Into<String>,
        method: Option<String>,
        receipt_url: Option<String>,
        approved_at: Timestamp,
    ) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Paid)?;
        self.payment_key = Some(payment_key.into());
        self.method = method;
        self.receipt_url = receipt_url;
        self.approved_at = Some(approved_at);
        self.updated_at = approved_at;
        Ok(())
    }

    /// Marks the payment definitively failed.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyProcessed` unless the payment is Pending.
    pub fn fail(
        &mut self,
        code: impl Into<String>,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Failed)?;
        self.failure_code = Some(code.into());
        self.failure_reason = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }

    /// Marks a settled payment reversed.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyProcessed` unless the payment is Paid.
    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        canceled_at: Timestamp,
    ) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Cancelled)?;
        self.cancel_reason = Some(reason.into());
        self.canceled_at = Some(canceled_at);
        self.updated_at = canceled_at;
        Ok(())
    }

    fn transition_to(&mut self, target: PaymentStatus) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| PaymentError::already_processed(self.order_id.clone(), self.status))?;
        Ok(())
    }
}
