//! Payment gateway port for the external payment processor.
//!
//! The gateway authorizes, confirms, and reverses charges for an order id.
//! Calls are synchronous request/response and may fail or time out; the
//! orchestrator decides what each outcome means for local state.
//!
//! # Design
//!
//! - **Definitive results only**: a confirmation is trusted only when the
//!   gateway reports a settled status
//! - **Timeouts are failures**: an unknown outcome is recorded as failed,
//!   never assumed successful

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::payment::OrderId;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirms (settles) an authorized payment.
    async fn confirm(&self, request: ConfirmRequest) -> Result<GatewayConfirmation, GatewayError>;

    /// Cancels a settled payment, fully or partially.
    async fn cancel(
        &self,
        payment_key: &str,
        request: CancelRequest,
    ) -> Result<GatewayCancellation, GatewayError>;
}

/// Request to confirm a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    /// Gateway-issued payment key from the checkout redirect.
    pub payment_key: String,

    /// Our order id, echoed back by the gateway.
    pub order_id: OrderId,

    /// Amount the client authorized.
    pub amount: i64,
}

/// Request to cancel a settled payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Human-readable cancellation reason, forwarded to the gateway.
    pub reason: String,

    /// Amount to cancel; None means the full settled amount.
    pub amount: Option<i64>,
}

/// Payment status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayPaymentStatus {
    /// Payment is settled.
    Done,

    /// Payment was fully canceled.
    Canceled,

    /// Payment was partially canceled.
    PartialCanceled,

    /// Payment was aborted before settlement.
    Aborted,

    /// The checkout session expired.
    Expired,

    /// Still being processed.
    InProgress,

    /// Unrecognized status from the gateway.
    #[serde(other)]
    Unknown,
}

impl GatewayPaymentStatus {
    /// True only for the one status that justifies marking a payment Paid.
    pub fn is_settled(&self) -> bool {
        matches!(self, GatewayPaymentStatus::Done)
    }

    /// True when the gateway acknowledged a full or partial reversal.
    pub fn is_reversed(&self) -> bool {
        matches!(
            self,
            GatewayPaymentStatus::Canceled | GatewayPaymentStatus::PartialCanceled
        )
    }
}

/// Successful confirm response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfirmation {
    pub payment_key: String,
    pub status: GatewayPaymentStatus,

    /// Payment method, e.g. "CARD".
    pub method: Option<String>,

    pub approved_at: Timestamp,
    pub receipt_url: Option<String>,
}

/// Successful cancel response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCancellation {
    pub status: GatewayPaymentStatus,
    pub canceled_at: Timestamp,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code, when one was returned.
    pub gateway_code: Option<String>,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            gateway_code: None,
        }
    }

    /// Attach the gateway's own error code.
    pub fn with_gateway_code(mut self, code: impl Into<String>) -> Self {
        self.gateway_code = Some(code.into());
        self
    }

    /// The call did not complete within the configured deadline.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    /// Transport-level failure before any gateway verdict.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// The gateway answered and refused the operation.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, message)
    }

    /// The gateway answered with something we could not parse.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    /// True when the outcome at the gateway is unknown (timeout, transport
    /// failure); the orchestrator treats these as likely-failed.
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self.code,
            GatewayErrorCode::Timeout | GatewayErrorCode::NetworkError
        )
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Call exceeded its deadline; outcome unknown.
    Timeout,

    /// Transport failure; outcome unknown.
    NetworkError,

    /// The gateway refused the operation.
    Rejected,

    /// Unparseable or contradictory response.
    InvalidResponse,

    /// Gateway-side server error.
    ProviderError,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::Timeout => "timeout",
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::Rejected => "rejected",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
