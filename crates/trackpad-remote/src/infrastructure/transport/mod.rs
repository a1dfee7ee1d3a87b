//! Transport adapters and the selection logic between them.
//!
//! - [`socket::SocketChannel`] – the preferred low-latency WebSocket channel.
//! - [`http::HttpFallback`] – one fire-and-forget `POST` per message.
//! - [`FailoverTransport`] – tries the channel when it reports itself
//!   connected and falls back to HTTP otherwise, or when the channel send
//!   fails.

pub mod health;
pub mod http;
pub mod pending;
pub mod socket;

use std::sync::Arc;

use tracing::debug;
use trackpad_core::Envelope;

use crate::application::dispatch::{Transport, TransportError};

pub use health::HealthReporter;
pub use http::{HttpFallback, HttpFallbackConfig};
pub use pending::PendingRequests;
pub use socket::{SocketChannel, SocketChannelConfig};

/// Where the executor listens unless configured otherwise.
pub const DEFAULT_EXECUTOR_URL: &str = "http://127.0.0.1:51273";

pub struct FailoverTransport {
    primary: Option<Arc<dyn Transport>>,
    fallback: Arc<dyn Transport>,
}

impl FailoverTransport {
    pub fn new(primary: Option<Arc<dyn Transport>>, fallback: Arc<dyn Transport>) -> Self {
        Self { primary, fallback }
    }

    /// A transport that never tries the channel.
    pub fn fallback_only(fallback: Arc<dyn Transport>) -> Self {
        Self::new(None, fallback)
    }
}

impl Transport for FailoverTransport {
    fn is_available(&self) -> bool {
        self.primary.as_ref().is_some_and(|p| p.is_available()) || self.fallback.is_available()
    }

    fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if let Some(primary) = self.primary.as_ref().filter(|p| p.is_available()) {
            match primary.deliver(envelope) {
                Ok(()) => return Ok(()),
                Err(e) => debug!(event = envelope.event, "channel send failed, using fallback: {e}"),
            }
        }
        self.fallback.deliver(envelope)
    }
}
