//! HTTP fallback transport.
//!
//! Each envelope becomes one `POST {base_url}{path}` with the envelope's HTTP
//! body.  The request runs on a spawned task and its response is discarded;
//! the only observers of completion are the pending-request set (through the
//! guard held by the task) and the health indicator.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, trace};
use trackpad_core::Envelope;

use crate::application::dispatch::{Transport, TransportError};
use crate::infrastructure::transport::health::HealthReporter;
use crate::infrastructure::transport::pending::{PendingRequests, DEFAULT_MAX_IN_FLIGHT};
use crate::infrastructure::transport::DEFAULT_EXECUTOR_URL;

#[derive(Debug, Clone)]
pub struct HttpFallbackConfig {
    /// Executor base URL, e.g. `http://192.168.1.20:51273`.
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_in_flight: usize,
}

impl Default for HttpFallbackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXECUTOR_URL.to_string(),
            request_timeout: Duration::from_secs(2),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

pub struct HttpFallback {
    client: reqwest::Client,
    base_url: String,
    pending: Arc<PendingRequests>,
    health: HealthReporter,
}

impl HttpFallback {
    /// # Errors
    ///
    /// [`TransportError::InvalidUrl`] unless `base_url` is an `http` or
    /// `https` URL.
    pub fn new(config: HttpFallbackConfig, health: HealthReporter) -> Result<Self, TransportError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(TransportError::InvalidUrl(config.base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            pending: PendingRequests::new(config.max_in_flight),
            health,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }
}

impl Transport for HttpFallback {
    fn is_available(&self) -> bool {
        true
    }

    fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let guard = self.pending.admit(envelope.category)?;

        let request = self.client.post(self.url_for(envelope.path)).json(&envelope.http_body);
        let health = self.health.clone();
        let path = envelope.path;
        trace!(
            path,
            in_flight = self.pending.in_flight(envelope.category),
            "fallback request admitted"
        );

        runtime.spawn(async move {
            let _guard = guard;
            match request.send().await {
                Ok(response) => {
                    trace!(path, status = %response.status(), "fallback request completed");
                    health.fallback_result(true);
                }
                Err(e) => {
                    debug!(path, "fallback request failed: {e}");
                    health.fallback_result(false);
                }
            }
        });
        Ok(())
    }
}
