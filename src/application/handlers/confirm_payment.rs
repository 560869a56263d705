//! ConfirmPaymentHandler - drives PENDING → PAID/FAILED against the gateway.
//!
//! Invoked from the payment-gateway redirect callback. The external gateway
//! does not guarantee single delivery, so confirmation is idempotent: a
//! second call for an already-settled order is a no-op success that keeps
//! the original approval timestamp.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{OrderId, Payment, PaymentError, PaymentStatus};
use crate::ports::{
    Clock, ConfirmRequest, GatewayError, PaymentFailure, PaymentGateway, PaymentRepository,
    PaymentSettlement, TransitionOutcome,
};

/// Command to confirm a payment after gateway checkout.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub order_id: OrderId,
    pub payment_key: String,
    pub amount: i64,
}

/// Result of a (possibly idempotent) successful confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub approved_at: Timestamp,
}

/// Handler for payment confirmation.
pub struct ConfirmPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            payments,
            gateway,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
    ) -> Result<ConfirmPaymentResult, PaymentError> {
        // 1. Load; an unknown order means an unknown reservation.
        let payment = self
            .payments
            .find_by_order_id(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(cmd.order_id.clone()))?;

        // 2. Idempotency guard: a retried callback on a settled order is a
        // no-op success, never a second transition.
        match payment.status {
            PaymentStatus::Paid => return Ok(Self::settled_result(&payment)),
            PaymentStatus::Failed | PaymentStatus::Cancelled => {
                return Err(PaymentError::already_processed(
                    cmd.order_id.clone(),
                    payment.status,
                ));
            }
            PaymentStatus::Pending => {}
        }

        // 3. The submitted amount must match what was prepared; a mismatch
        // is a definitive failure recorded without calling the gateway.
        if payment.amount != cmd.amount {
            self.record_failure(
                &cmd.order_id,
                "AMOUNT_MISMATCH",
                format!("expected {}, got {}", payment.amount, cmd.amount),
            )
            .await;
            return Err(PaymentError::amount_mismatch(payment.amount, cmd.amount));
        }

        // 4. Ask the gateway to settle. The call may fail or time out.
        let confirmation = self
            .gateway
            .confirm(ConfirmRequest {
                payment_key: cmd.payment_key.clone(),
                order_id: cmd.order_id.clone(),
                amount: cmd.amount,
            })
            .await;

        let confirmation = match confirmation {
            Ok(confirmation) if confirmation.status.is_settled() => confirmation,
            Ok(confirmation) => {
                // The gateway answered, but not with a settled payment.
                let reason = format!("gateway returned {:?}", confirmation.status);
                self.record_failure(&cmd.order_id, "NOT_SETTLED", reason.clone()).await;
                return Err(PaymentError::confirm_failed(reason));
            }
            Err(err) => return Err(self.confirm_call_failed(&cmd.order_id, err).await),
        };

        // 5. Commit the settlement under the row guard. A concurrent
        // confirm may have won; that is still a success for this caller.
        let settlement = PaymentSettlement {
            payment_key: confirmation.payment_key.clone(),
            method: confirmation.method.clone(),
            receipt_url: confirmation.receipt_url.clone(),
            approved_at: confirmation.approved_at,
        };

        match self.payments.mark_paid(&cmd.order_id, &settlement).await? {
            TransitionOutcome::Applied => {
                tracing::info!(order_id = %cmd.order_id, "payment confirmed");
                Ok(ConfirmPaymentResult {
                    order_id: cmd.order_id,
                    status: PaymentStatus::Paid,
                    approved_at: confirmation.approved_at,
                })
            }
            TransitionOutcome::AlreadyApplied => {
                let stored = self
                    .payments
                    .find_by_order_id(&cmd.order_id)
                    .await?
                    .ok_or_else(|| PaymentError::not_found(cmd.order_id.clone()))?;
                Ok(Self::settled_result(&stored))
            }
            TransitionOutcome::InvalidState(status) => {
                Err(PaymentError::already_processed(cmd.order_id, status))
            }
        }
    }

    fn settled_result(payment: &Payment) -> ConfirmPaymentResult {
        ConfirmPaymentResult {
            order_id: payment.order_id.clone(),
            status: payment.status,
            // A Paid row always carries its approval time.
            approved_at: payment.approved_at.unwrap_or(payment.updated_at),
        }
    }

    /// A gateway transport failure or explicit rejection. The outcome of a
    /// timed-out call is unknown; crediting a payment that may not have gone
    /// through is the dangerous direction, so unknown is recorded as failed.
    async fn confirm_call_failed(&self, order_id: &OrderId, err: GatewayError) -> PaymentError {
        if err.outcome_unknown() {
            tracing::error!(
                order_id = %order_id,
                error = %err,
                "gateway confirm outcome unknown; recording as failed"
            );
        } else {
            tracing::warn!(order_id = %order_id, error = %err, "gateway rejected confirm");
        }
        let code = err
            .gateway_code
            .clone()
            .unwrap_or_else(|| err.code.to_string().to_uppercase());
        self.record_failure(order_id, &code, err.message.clone()).await;
        PaymentError::confirm_failed(err.message)
    }

    async fn record_failure(&self, order_id: &OrderId, code: &str, reason: String) {
        let failure = PaymentFailure {
            code: code.to_string(),
            reason,
            failed_at: self.clock.now(),
        };
        match self.payments.mark_failed(order_id, &failure).await {
            Ok(TransitionOutcome::Applied) | Ok(TransitionOutcome::AlreadyApplied) => {}
            Ok(TransitionOutcome::InvalidState(status)) => {
                tracing::warn!(
                    order_id = %order_id,
                    status = ?status,
                    "payment left its pending state before failure could be recorded"
                );
            }
            Err(err) => {
                tracing::error!(order_id = %order_id, error = %err, "failed to record payment failure");
            }
        }
    }
}
