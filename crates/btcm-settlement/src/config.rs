use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection and limits for a settlement gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Node address, `host:port`.
    pub endpoint: String,
    /// Upper bound on any single gateway call, in seconds.
    pub request_timeout: u64,
    /// Invoice lifetime, in seconds.
    pub invoice_expiry: u64,
    /// Largest amount an invoice may request.
    pub max_invoice_amount: u64,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:10009".into(),
            request_timeout: 30,
            invoice_expiry: 3600,
            max_invoice_amount: 4_294_967,
        }
    }
}
