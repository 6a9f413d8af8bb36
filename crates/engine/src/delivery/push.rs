//! Mobile push delivery via an HTTP gateway.
//!
//! [`HttpPushSender`] posts a JSON payload to an FCM-style push gateway
//! behind the [`PushSender`](crate::dispatch::PushSender) seam. The gateway
//! reports per-token success/failure counts; invalid or expired tokens are
//! pruned by an external token-management service, not here. If
//! `PUSH_GATEWAY_URL` is not set, [`PushConfig::from_env`] returns `None`
//! and the push channel is disabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::dispatch::PushSender;

/// HTTP request timeout for a single gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

/// Per-token delivery accounting reported by the gateway.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PushReceipt {
    /// Tokens the gateway accepted the message for.
    pub success_count: u32,
    /// Tokens the gateway rejected (stale, unregistered, malformed).
    pub failure_count: u32,
}

// ---------------------------------------------------------------------------
// PushConfig
// ---------------------------------------------------------------------------

/// Configuration for the HTTP push sender.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Push gateway endpoint URL.
    pub gateway_url: String,
    /// Optional bearer token for the gateway.
    pub api_key: Option<String>,
}

impl PushConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `PUSH_GATEWAY_URL` is not set, signalling that
    /// push delivery is not configured and the channel should be skipped.
    ///
    /// | Variable           | Required | Default |
    /// |--------------------|----------|---------|
    /// | `PUSH_GATEWAY_URL` | yes      | —       |
    /// | `PUSH_API_KEY`     | no       | —       |
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("PUSH_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url,
            api_key: std::env::var("PUSH_API_KEY").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// HttpPushSender
// ---------------------------------------------------------------------------

/// Delivers push notifications through an HTTP gateway.
pub struct HttpPushSender {
    config: PushConfig,
    client: reqwest::Client,
}

impl HttpPushSender {
    /// Create a new push sender with a pre-configured HTTP client.
    pub fn new(config: PushConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<PushReceipt, PushError> {
        let payload = serde_json::json!({
            "tokens": tokens,
            "notification": { "title": title, "body": body },
            "data": data,
        });

        let mut request = self.client.post(&self.config.gateway_url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }

        let receipt: PushReceipt = response.json().await?;
        tracing::info!(
            tokens = tokens.len(),
            success = receipt.success_count,
            failure = receipt.failure_count,
            "Push batch delivered"
        );
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_gateway_url() {
        std::env::remove_var("PUSH_GATEWAY_URL");
        assert!(PushConfig::from_env().is_none());
    }

    #[test]
    fn push_error_display_http_status() {
        let err = PushError::HttpStatus(502);
        assert_eq!(err.to_string(), "Push gateway returned HTTP 502");
    }

    #[test]
    fn receipt_deserializes_gateway_response() {
        let receipt: PushReceipt =
            serde_json::from_str(r#"{"success_count": 3, "failure_count": 1}"#).unwrap();
        assert_eq!(receipt.success_count, 3);
        assert_eq!(receipt.failure_count, 1);
    }
}
