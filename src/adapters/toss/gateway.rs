//! Toss Payments gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the Toss Payments REST
//! API: confirm settles an authorized checkout, cancel reverses a settled
//! payment by its payment key.
//!
//! # Security
//!
//! - Merchant secret key held in `secrecy::SecretString`, sent via HTTP
//!   basic auth with an empty password
//!
//! # Timeouts
//!
//! Every call carries the configured deadline. A timed-out confirm has an
//! unknown outcome; the error is reported as such and the orchestrator
//! records the payment failed rather than assuming success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    CancelRequest, ConfirmRequest, GatewayCancellation, GatewayConfirmation, GatewayError,
    GatewayPaymentStatus, PaymentGateway,
};

/// Default per-call deadline.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Toss Payments API configuration.
#[derive(Clone)]
pub struct TossConfig {
    /// Merchant secret key (test_sk_... or live_sk_...).
    secret_key: SecretString,

    /// Base URL for the Toss API (default: https://api.tosspayments.com).
    api_base_url: String,

    /// Per-call deadline.
    timeout: Duration,
}

impl TossConfig {
    /// Create a new Toss configuration.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: "https://api.tosspayments.com".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Toss Payments gateway adapter.
pub struct TossGateway {
    config: TossConfig,
    http_client: reqwest::Client,
}

impl TossGateway {
    /// Create a new Toss adapter with the given configuration.
    pub fn new(config: TossConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build gateway HTTP client");
        Self {
            config,
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn post(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<TossPaymentResponse, GatewayError> {
        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Some(""))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<TossPaymentResponse>()
                .await
                .map_err(|e| GatewayError::invalid_response(format!("bad payment body: {}", e)))
        } else {
            let error: TossErrorResponse = response.json().await.map_err(|e| {
                GatewayError::invalid_response(format!("bad error body ({}): {}", status, e))
            })?;
            let gateway_error = if status.is_server_error() {
                GatewayError::new(
                    crate::ports::GatewayErrorCode::ProviderError,
                    error.message.clone(),
                )
            } else {
                GatewayError::rejected(error.message.clone())
            };
            Err(gateway_error.with_gateway_code(error.code))
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::timeout(format!("gateway call timed out: {}", e))
    } else {
        GatewayError::network(format!("gateway call failed: {}", e))
    }
}

/// Payment object returned by the Toss API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TossPaymentResponse {
    payment_key: String,
    status: GatewayPaymentStatus,
    method: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    receipt: Option<TossReceipt>,
    cancels: Option<Vec<TossCancel>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TossReceipt {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TossCancel {
    canceled_at: Option<DateTime<Utc>>,
}

/// Error object returned by the Toss API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TossErrorResponse {
    code: String,
    message: String,
}

#[async_trait]
impl PaymentGateway for TossGateway {
    async fn confirm(&self, request: ConfirmRequest) -> Result<GatewayConfirmation, GatewayError> {
        let body = serde_json::json!({
            "paymentKey": request.payment_key,
            "orderId": request.order_id,
            "amount": request.amount,
        });

        let payment = self.post(self.url("/v1/payments/confirm"), body).await?;

        let approved_at = payment
            .approved_at
            .map(Timestamp::from_datetime)
            .unwrap_or_else(Timestamp::now);

        Ok(GatewayConfirmation {
            payment_key: payment.payment_key,
            status: payment.status,
            method: payment.method,
            approved_at,
            receipt_url: payment.receipt.map(|r| r.url),
        })
    }

    async fn cancel(
        &self,
        payment_key: &str,
        request: CancelRequest,
    ) -> Result<GatewayCancellation, GatewayError> {
        let mut body = serde_json::json!({ "cancelReason": request.reason });
        if let Some(amount) = request.amount {
            body["cancelAmount"] = serde_json::json!(amount);
        }

        let payment = self
            .post(self.url(&format!("/v1/payments/{}/cancel", payment_key)), body)
            .await?;

        let canceled_at = payment
            .cancels
            .and_then(|cancels| cancels.into_iter().filter_map(|c| c.canceled_at).last())
            .map(Timestamp::from_datetime)
            .unwrap_or_else(Timestamp::now);

        Ok(GatewayCancellation {
            status: payment.status,
            canceled_at,
        })
    }
}
