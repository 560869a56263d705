//! Payment gateway configuration.

use serde::Deserialize;
use std::time::Duration;

/// Toss Payments gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Merchant secret key (test_sk_... or live_sk_...).
    pub secret_key: String,

    /// API base URL; override for sandbox or test doubles.
    #[serde(default = "GatewayConfig::default_base_url")]
    pub api_base_url: String,

    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl GatewayConfig {
    pub fn default_base_url() -> String {
        "https://api.tosspayments.com".to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
