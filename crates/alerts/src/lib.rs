//! OrderPilot alert relay adapter.
//!
//! Implements [`fulfillment::AlertNotifier`] by POSTing each alert as a JSON
//! `{ "email": ..., "message": ... }` body to a form-relay endpoint (Formspree
//! in production), which forwards it to the operator mailbox.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport and relay status handling live here.
//! Callers treat delivery as best effort: a failed alert is logged by the
//! handler and never fails the request that raised it.

use std::time::Duration;

use async_trait::async_trait;
use fulfillment::{Alert, AlertError, AlertNotifier};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Relay used when none is configured.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://formspree.io/f/xwvvkgwa";

/// Upper bound on one relay request.
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// The relay endpoint could not be used.
#[derive(Debug, Error)]
pub enum RelayConfigError {
    #[error("invalid alert relay endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Posts alerts to a JSON form-relay endpoint.
#[derive(Debug, Clone)]
pub struct FormRelayNotifier {
    http: Client,
    endpoint: Url,
}

impl FormRelayNotifier {
    /// Creates a notifier for `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, RelayConfigError> {
        let endpoint = Url::parse(endpoint).map_err(|e| RelayConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let http = Client::builder().timeout(RELAY_TIMEOUT).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl AlertNotifier for FormRelayNotifier {
    #[instrument(skip(self, alert), fields(recipient = %alert.email))]
    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(alert)
            .send()
            .await
            .map_err(|e| AlertError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError {
                message: format!("relay returned {status}: {body}"),
            });
        }

        info!("alert delivered");
        Ok(())
    }
}

/// Notifier used when alert delivery is switched off: the alert is written to
/// the log instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifier;

#[async_trait]
impl AlertNotifier for LogOnlyNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        warn!(recipient = %alert.email, message = %alert.message, "alert relay disabled; alert logged only");
        Ok(())
    }
}
