//! Transport contracts.
//!
//! A [`TransportConnector`] creates one [`Transport`] per connection attempt.
//! The transport runs its receive loop on its own task and reports lifecycle
//! and inbound data to a [`TransportListener`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ndc_core::{TransportError, TransportResult};

// =============================================================================
// Listener
// =============================================================================

/// Receives notifications from a running transport.
///
/// Called from the transport's receive task.
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// Called once the connection is established.
    async fn on_open(&self);

    /// Called for each inbound text or binary frame.
    async fn on_message(&self, data: &[u8]);

    /// Called once when the transport stops, for any reason.
    async fn on_close(&self, reason: &str);

    /// Called when the transport hits an error. `on_close` follows.
    async fn on_error(&self, error: &TransportError);
}

/// Shared listener.
pub type BoxedListener = Arc<dyn TransportListener>;

// =============================================================================
// Transport
// =============================================================================

/// One live connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queues data for sending.
    async fn send(&self, data: Vec<u8>) -> TransportResult<()>;

    /// Stops keep-alive, stops forwarding inbound frames and releases the
    /// connection. Safe to call more than once.
    async fn close(&self);

    /// Returns `true` until the transport has been closed or has failed.
    fn is_running(&self) -> bool;
}

/// Shared transport.
pub type BoxedTransport = Arc<dyn Transport>;

/// Creates transports.
pub trait TransportConnector: Send + Sync {
    /// Creates a transport for `request` and starts its receive loop.
    ///
    /// Returns immediately; the outcome of the connection attempt is reported
    /// through `listener`. Must be called from within a tokio runtime.
    fn connect(&self, request: ConnectRequest, listener: BoxedListener) -> BoxedTransport;
}

// =============================================================================
// Connect Request
// =============================================================================

/// Everything needed to open one connection.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    /// Endpoint URL.
    pub url: String,
    /// Extra upgrade headers.
    pub headers: Vec<(String, String)>,
    /// Keep-alive ping interval (None = no pings).
    pub ping_interval: Option<Duration>,
}

impl ConnectRequest {
    /// Creates a request for `url` with no headers and no keep-alive.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            ping_interval: None,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the keep-alive ping interval.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = Some(interval);
        self
    }

    /// Returns the value of a header, if set.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
