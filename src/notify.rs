//! Best-effort view notifications.
//!
//! Every decoded payload is POSTed as plain text to the configured
//! notification endpoint (for example an ntfy topic). Delivery is strictly
//! fire-and-forget: the image response never depends on the outcome, and
//! failures are logged and discarded.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{BeaconError, Result};

/// Configuration for the notification client.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Notification endpoint URL; `None` disables notifications.
    pub url: Option<String>,
    /// Timeout for the notification POST.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(5),
            user_agent: "Beacon-Notify/1.0".to_string(),
        }
    }
}

/// HTTP client for one-way view notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl Notifier {
    /// Creates a new notifier with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `BeaconError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: NotifyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                BeaconError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, url: config.url })
    }

    /// Whether a notification endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Records a view, swallowing any delivery failure.
    ///
    /// This is the only entry point the signal handler uses: the result of
    /// [`try_record`](Self::try_record) is logged and discarded so the image
    /// response cannot be affected.
    pub async fn record_view(&self, payload: &str) {
        if !self.is_enabled() {
            return;
        }

        match self.try_record(payload).await {
            Ok(()) => debug!("view notification delivered"),
            Err(e) => warn!(error = %e, "view notification failed"),
        }
    }

    /// Delivers a view notification to the configured endpoint.
    ///
    /// Sends a plain-text POST with body `img-view: <payload> @ <timestamp>`
    /// where the timestamp is RFC 3339 UTC. The response body is not
    /// consumed.
    ///
    /// # Errors
    ///
    /// - `NotifyNetwork` for connection failures and timeouts
    /// - `NotifyStatus` for non-2xx responses
    pub async fn try_record(&self, payload: &str) -> Result<()> {
        let Some(url) = &self.url else { return Ok(()) };

        let body = format!("img-view: {payload} @ {}", Utc::now().to_rfc3339());

        let span = info_span!("view_notification", url = %url);

        async move {
            debug!("sending view notification");

            let response = self
                .client
                .post(url)
                .header("content-type", "text/plain")
                .body(body)
                .send()
                .await
                .map_err(|e| BeaconError::notify_network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(BeaconError::notify_status(status.as_u16()));
            }

            Ok(())
        }
        .instrument(span)
        .await
    }
}
