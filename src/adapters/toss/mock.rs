//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for
//! unit and integration tests. Supports:
//! - Pre-configured confirm/cancel responses
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    CancelRequest, ConfirmRequest, GatewayCancellation, GatewayConfirmation, GatewayError,
    GatewayPaymentStatus, PaymentGateway,
};

/// Mock payment gateway for testing.
///
/// By default every confirm settles and every cancel is acknowledged.
#[derive(Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Error to return on the next confirm call.
    confirm_error: Option<GatewayError>,

    /// Error to return on the next cancel call.
    cancel_error: Option<GatewayError>,

    /// Status to answer confirms with instead of DONE.
    confirm_status: Option<GatewayPaymentStatus>,

    /// Recorded confirm requests.
    confirm_calls: Vec<ConfirmRequest>,

    /// Recorded cancel requests, with the payment key used.
    cancel_calls: Vec<(String, CancelRequest)>,
}

impl MockGateway {
    /// Create a mock that settles everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every confirm call with the given error.
    pub fn set_confirm_error(&self, err: GatewayError) {
        self.inner.lock().unwrap().confirm_error = Some(err);
    }

    /// Fail every cancel call with the given error.
    pub fn set_cancel_error(&self, err: GatewayError) {
        self.inner.lock().unwrap().cancel_error = Some(err);
    }

    /// Answer confirms with a non-settled status.
    pub fn set_confirm_status(&self, status: GatewayPaymentStatus) {
        self.inner.lock().unwrap().confirm_status = Some(status);
    }

    /// Confirm requests received so far.
    pub fn confirm_calls(&self) -> Vec<ConfirmRequest> {
        self.inner.lock().unwrap().confirm_calls.clone()
    }

    /// Cancel requests received so far.
    pub fn cancel_calls(&self) -> Vec<(String, CancelRequest)> {
        self.inner.lock().unwrap().cancel_calls.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn confirm(&self, request: ConfirmRequest) -> Result<GatewayConfirmation, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.confirm_calls.push(request.clone());
        if let Some(err) = &state.confirm_error {
            return Err(err.clone());
        }
        Ok(GatewayConfirmation {
            payment_key: request.payment_key,
            status: state.confirm_status.unwrap_or(GatewayPaymentStatus::Done),
            method: Some("CARD".to_string()),
            approved_at: Timestamp::now(),
            receipt_url: Some("https://gateway.example/receipts/mock".to_string()),
        })
    }

    async fn cancel(
        &self,
        payment_key: &str,
        request: CancelRequest,
    ) -> Result<GatewayCancellation, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state
            .cancel_calls
            .push((payment_key.to_string(), request.clone()));
        if let Some(err) = &state.cancel_error {
            return Err(err.clone());
        }
        Ok(GatewayCancellation {
            status: GatewayPaymentStatus::Canceled,
            canceled_at: Timestamp::now(),
        })
    }
}
