//! CancelPaymentHandler - reverses a settled payment through the gateway.
//!
//! Never invoked directly by clients; the cancellation workflow calls it
//! when a paid reservation is canceled. On any gateway failure the local
//! payment stays Paid so the workflow will not mark the reservation
//! canceled on top of money the platform still holds.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{OrderId, PaymentError, PaymentStatus};
use crate::ports::{
    CancelRequest, PaymentGateway, PaymentRepository, PaymentReversal, TransitionOutcome,
};

/// Command to reverse a settled payment.
#[derive(Debug, Clone)]
pub struct CancelPaymentCommand {
    pub order_id: OrderId,

    /// Human-readable reason, forwarded to the gateway.
    pub reason: String,

    /// Amount to cancel; None reverses the full settled amount.
    pub amount: Option<i64>,
}

/// Result of a successful reversal.
#[derive(Debug, Clone)]
pub struct CancelPaymentResult {
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub canceled_at: Timestamp,
}

/// Handler for payment cancellation.
pub struct CancelPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CancelPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { payments, gateway }
    }

    pub async fn handle(
        &self,
        cmd: CancelPaymentCommand,
    ) -> Result<CancelPaymentResult, PaymentError> {
        // 1. Load; an unknown order means an unknown reservation.
        let payment = self
            .payments
            .find_by_order_id(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(cmd.order_id.clone()))?;

        // 2. Only a settled payment can be reversed.
        if payment.status != PaymentStatus::Paid {
            return Err(PaymentError::already_processed(
                cmd.order_id.clone(),
                payment.status,
            ));
        }
        let payment_key = payment.payment_key.clone().ok_or_else(|| {
            PaymentError::infrastructure("paid payment is missing its gateway key")
        })?;

        // 3. Ask the gateway to reverse; default to the full amount.
        let cancellation = self
            .gateway
            .cancel(
                &payment_key,
                CancelRequest {
                    reason: cmd.reason.clone(),
                    amount: Some(cmd.amount.unwrap_or(payment.amount)),
                },
            )
            .await
            .map_err(|err| {
                tracing::error!(
                    order_id = %cmd.order_id,
                    error = %err,
                    "gateway cancel failed; payment stays settled"
                );
                PaymentError::cancel_failed(err.message)
            })?;

        if !cancellation.status.is_reversed() {
            return Err(PaymentError::cancel_failed(format!(
                "gateway returned {:?} instead of a cancellation",
                cancellation.status
            )));
        }

        // 4. Commit the reversal under the row guard.
        let reversal = PaymentReversal {
            reason: cmd.reason,
            canceled_at: cancellation.canceled_at,
        };

        match self.payments.mark_cancelled(&cmd.order_id, &reversal).await? {
            TransitionOutcome::Applied => {
                tracing::info!(order_id = %cmd.order_id, "payment cancelled");
                Ok(CancelPaymentResult {
                    order_id: cmd.order_id,
                    status: PaymentStatus::Cancelled,
                    canceled_at: cancellation.canceled_at,
                })
            }
            TransitionOutcome::AlreadyApplied => {
                let stored = self
                    .payments
                    .find_by_order_id(&cmd.order_id)
                    .await?
                    .ok_or_else(|| PaymentError::not_found(cmd.order_id.clone()))?;
                Ok(CancelPaymentResult {
                    order_id: cmd.order_id,
                    status: stored.status,
                    canceled_at: stored.canceled_at.unwrap_or(cancellation.canceled_at),
                })
            }
            TransitionOutcome::InvalidState(status) => {
                Err(PaymentError::already_processed(cmd.order_id, status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ReservationId};
    use crate::domain::payment::Payment;
    use crate::ports::{
        ConfirmRequest, GatewayCancellation, GatewayConfirmation, GatewayError,
        GatewayPaymentStatus, PaymentFailure, PaymentSettlement,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockPayments {
        payments: Mutex<Vec<Payment>>,
    }

    impl MockPayments {
        fn with(payment: Payment) -> Self {
            Self {
                payments: Mutex::new(vec![payment]),
            }
        }

        fn get(&self, order_id: &OrderId) -> Option<Payment> {
            self.payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.order_id == order_id)
                .cloned()
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPayments {
        async fn find_by_order_id(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<Payment>, DomainError> {
            Ok(self.get(order_id))
        }

        async fn find_by_reservation_id(
            &self,
            reservation_id: ReservationId,
        ) -> Result<Option<Payment>, DomainError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.reservation_id == reservation_id)
                .cloned())
        }

        async fn mark_paid(
            &self,
            _order_id: &OrderId,
            _settlement: &PaymentSettlement,
        ) -> Result<TransitionOutcome, DomainError> {
            unimplemented!("not exercised by cancel tests")
        }

        async fn mark_failed(
            &self,
            _order_id: &OrderId,
            _failure: &PaymentFailure,
        ) -> Result<TransitionOutcome, DomainError> {
            unimplemented!("not exercised by cancel tests")
        }

        async fn mark_cancelled(
            &self,
            order_id: &OrderId,
            reversal: &PaymentReversal,
        ) -> Result<TransitionOutcome, DomainError> {
            let mut payments = self.payments.lock().unwrap();
            let payment = payments.iter_mut().find(|p| &p.order_id == order_id).unwrap();
            match payment.status {
                PaymentStatus::Cancelled => Ok(TransitionOutcome::AlreadyApplied),
                PaymentStatus::Paid => {
                    payment
                        .cancel(reversal.reason.clone(), reversal.canceled_at)
                        .unwrap();
                    Ok(TransitionOutcome::Applied)
                }
                other => Ok(TransitionOutcome::InvalidState(other)),
            }
        }
    }

    struct MockGateway {
        fail_with: Option<GatewayError>,
        cancel_calls: Mutex<Vec<(String, CancelRequest)>>,
    }

    impl MockGateway {
        fn acknowledging() -> Self {
            Self {
                fail_with: None,
                cancel_calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: GatewayError) -> Self {
            Self {
                fail_with: Some(err),
                cancel_calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, CancelRequest)> {
            self.cancel_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn confirm(
            &self,
            _request: ConfirmRequest,
        ) -> Result<GatewayConfirmation, GatewayError> {
            unimplemented!("not exercised by cancel tests")
        }

        async fn cancel(
            &self,
            payment_key: &str,
            request: CancelRequest,
        ) -> Result<GatewayCancellation, GatewayError> {
            self.cancel_calls
                .lock()
                .unwrap()
                .push((payment_key.to_string(), request));
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(GatewayCancellation {
                status: GatewayPaymentStatus::Canceled,
                canceled_at: Timestamp::now(),
            })
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn order_id() -> OrderId {
        OrderId::new("ord-aaaa-bbbb-1722160800000")
    }

    fn paid_payment() -> Payment {
        let mut payment = Payment::prepare(order_id(), ReservationId::new(), 50_000, Timestamp::now());
        payment
            .confirm("pay_key_123", Some("CARD".into()), None, Timestamp::now())
            .unwrap();
        payment
    }

    fn command() -> CancelPaymentCommand {
        CancelPaymentCommand {
            order_id: order_id(),
            reason: "Schedule conflict".to_string(),
            amount: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn reverses_a_paid_payment_in_full() {
        let payments = Arc::new(MockPayments::with(paid_payment()));
        let gateway = Arc::new(MockGateway::acknowledging());

        let result = CancelPaymentHandler::new(payments.clone(), gateway.clone())
            .handle(command())
            .await
            .unwrap();

        assert_eq!(result.status, PaymentStatus::Cancelled);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pay_key_123");
        // Full amount by default.
        assert_eq!(calls[0].1.amount, Some(50_000));
        assert_eq!(calls[0].1.reason, "Schedule conflict");

        let stored = payments.get(&order_id()).unwrap();
        assert_eq!(stored.status, PaymentStatus::Cancelled);
        assert_eq!(stored.cancel_reason.as_deref(), Some("Schedule conflict"));
    }

    #[tokio::test]
    async fn partial_amount_is_forwarded() {
        let payments = Arc::new(MockPayments::with(paid_payment()));
        let gateway = Arc::new(MockGateway::acknowledging());

        let mut cmd = command();
        cmd.amount = Some(20_000);
        CancelPaymentHandler::new(payments, gateway.clone())
            .handle(cmd)
            .await
            .unwrap();

        assert_eq!(gateway.calls()[0].1.amount, Some(20_000));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn pending_payment_cannot_be_cancelled() {
        let pending = Payment::prepare(order_id(), ReservationId::new(), 50_000, Timestamp::now());
        let payments = Arc::new(MockPayments::with(pending));
        let gateway = Arc::new(MockGateway::acknowledging());

        let result = CancelPaymentHandler::new(payments, gateway.clone())
            .handle(command())
            .await;

        assert!(matches!(
            result,
            Err(PaymentError::AlreadyProcessed { status: PaymentStatus::Pending, .. })
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_leaves_payment_paid() {
        let payments = Arc::new(MockPayments::with(paid_payment()));
        let gateway = Arc::new(MockGateway::failing(GatewayError::network("connection reset")));

        let result = CancelPaymentHandler::new(payments.clone(), gateway)
            .handle(command())
            .await;

        assert!(matches!(result, Err(PaymentError::CancelFailed { .. })));
        let stored = payments.get(&order_id()).unwrap();
        assert_eq!(stored.status, PaymentStatus::Paid);
        assert!(stored.canceled_at.is_none());
    }

    #[tokio::test]
    async fn second_cancel_is_already_processed() {
        let payments = Arc::new(MockPayments::with(paid_payment()));
        let gateway = Arc::new(MockGateway::acknowledging());
        let handler = CancelPaymentHandler::new(payments, gateway);

        handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await;

        assert!(matches!(
            second,
            Err(PaymentError::AlreadyProcessed { status: PaymentStatus::Cancelled, .. })
        ));
    }
}
