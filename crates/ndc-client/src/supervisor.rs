//! Connection supervisor.
//!
//! Owns one transport at a time and drives its lifecycle:
//!
//! ```text
//! Closed ──open()──▶ Connecting ──on_open──▶ Open ──on_close / close()──▶ Closed
//! ```
//!
//! Every `open()` signs fresh credentials and creates a brand-new transport.
//! When opened with `is_initial`, a single rotation loop sleeps for the
//! rotation interval, then closes and reopens the connection, until
//! [`Supervisor::stop_rotation`] clears its flag. Transport errors are only
//! logged; a failed connection stays closed until the next rotation.
//!
//! Inbound frames take two hops. The transport's receive task decodes each
//! frame, stores it in the last-frame slot and pushes it onto a channel. A
//! drain task pulls frames off the channel and spawns one dispatch per frame,
//! so a slow callback never blocks the socket.
//!
//! Each transport is tagged with a generation number. Notifications from a
//! transport that has since been closed or replaced are ignored.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use ndc_core::{Frame, TransportError, TransportResult};
use ndc_transport::{BoxedTransport, TransportConnector, TransportListener};

use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, SignedCredentials};
use crate::dispatch::Dispatcher;

/// Externally visible connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
        }
    }
}

struct Connection {
    transport: Option<BoxedTransport>,
    generation: u64,
    state: ConnectionState,
}

struct Shared {
    config: ClientConfig,
    connector: Arc<dyn TransportConnector>,
    credentials: Arc<dyn CredentialProvider>,
    dispatcher: Arc<Dispatcher>,
    connection: Mutex<Connection>,
    last_frame: RwLock<Option<Frame>>,
    frame_tx: mpsc::UnboundedSender<Frame>,
    frame_rx: Mutex<Option<mpsc::UnboundedReceiver<Frame>>>,
    rotating: AtomicBool,
    rotation: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.connection.lock().generation == generation
    }
}

/// Handle to the connection supervisor. Cloning is cheap.
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl Supervisor {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn TransportConnector>,
        credentials: Arc<dyn CredentialProvider>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                config,
                connector,
                credentials,
                dispatcher,
                connection: Mutex::new(Connection {
                    transport: None,
                    generation: 0,
                    state: ConnectionState::Closed,
                }),
                last_frame: RwLock::new(None),
                frame_tx,
                frame_rx: Mutex::new(Some(frame_rx)),
                rotating: AtomicBool::new(false),
                rotation: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.shared.dispatcher
    }

    /// Opens a new connection with freshly signed credentials.
    ///
    /// Always creates a new transport, replacing any current one. With
    /// `is_initial` the rotation loop is started as well. Must be called from
    /// within a tokio runtime.
    pub fn open(&self, is_initial: bool) {
        self.start_drain();

        let credentials = SignedCredentials::now(self.shared.credentials.as_ref());
        let request = credentials.connect_request(&self.shared.config);

        let generation = {
            let mut connection = self.shared.connection.lock();
            connection.generation += 1;
            connection.state = ConnectionState::Connecting;
            connection.generation
        };
        info!(generation, url = %self.shared.config.url, "Opening connection");

        let listener = Arc::new(ConnectionListener {
            generation,
            shared: Arc::clone(&self.shared),
        });
        let transport = self.shared.connector.connect(request, listener);

        {
            let mut connection = self.shared.connection.lock();
            if connection.generation == generation {
                if connection.transport.replace(transport).is_some() {
                    debug!(generation, "Replaced a connection that was never closed");
                }
            } else {
                debug!(generation, "Connection superseded before it was stored");
            }
        }

        if is_initial && self.shared.config.rotation_enabled {
            self.start_rotation();
        }
    }

    /// Closes the current transport and waits for the settle delay.
    ///
    /// Safe to call when nothing is open. The state is `Closed` on return.
    pub async fn close(&self) {
        let transport = {
            let mut connection = self.shared.connection.lock();
            connection.generation += 1;
            connection.state = ConnectionState::Closed;
            connection.transport.take()
        };

        match transport {
            Some(transport) => {
                info!("Closing connection");
                transport.close().await;
            }
            None => debug!("Close requested with no active connection"),
        }

        tokio::time::sleep(self.shared.config.settle_delay()).await;
    }

    /// Clears the rotation flag. The loop exits at its next wake-up.
    pub fn stop_rotation(&self) {
        self.shared.rotating.store(false, Ordering::SeqCst);
    }

    pub fn is_rotating(&self) -> bool {
        self.shared.rotating.load(Ordering::SeqCst)
    }

    /// Stops rotation immediately and closes the connection.
    pub async fn shutdown(&self) {
        self.stop_rotation();
        if let Some(handle) = self.shared.rotation.lock().take() {
            handle.abort();
        }
        self.close().await;
        info!("Supervisor shut down");
    }

    /// Sends a frame over the current transport.
    pub async fn send(&self, frame: &Frame) -> TransportResult<()> {
        let transport = self
            .shared
            .connection
            .lock()
            .transport
            .clone()
            .ok_or(TransportError::NotConnected)?;
        let data = frame
            .to_bytes()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        trace!(code = frame.code, "Sending frame");
        transport.send(data).await
    }

    /// Returns the last frame received, if any. May be stale.
    pub fn receive(&self) -> Option<Frame> {
        self.shared.last_frame.read().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.connection.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Human-readable open/closed status.
    pub fn status(&self) -> &'static str {
        if self.is_open() {
            "Sockets are OPEN"
        } else {
            "Sockets are CLOSED"
        }
    }

    fn start_rotation(&self) {
        self.shared.rotating.store(true, Ordering::SeqCst);
        let supervisor = self.clone();
        let handle = tokio::spawn(supervisor.rotation_loop());
        if let Some(previous) = self.shared.rotation.lock().replace(handle) {
            previous.abort();
        }
    }

    async fn rotation_loop(self) {
        let interval = self.shared.config.rotation_interval();
        info!(interval_secs = interval.as_secs(), "Connection rotation started");

        while self.is_rotating() {
            tokio::time::sleep(interval).await;
            if !self.is_rotating() {
                break;
            }
            info!("Rotating connection");
            self.close().await;
            if !self.is_rotating() {
                break;
            }
            self.open(false);
        }

        debug!("Connection rotation stopped");
    }

    /// Spawns the drain task on first use.
    fn start_drain(&self) {
        let Some(mut frames) = self.shared.frame_rx.lock().take() else {
            return;
        };
        let dispatcher = Arc::clone(&self.shared.dispatcher);

        tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.dispatch(&frame).await {
                        warn!(code = frame.code, error = %e, "Failed to dispatch frame");
                    }
                });
            }
            debug!("Frame drain stopped");
        });
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("url", &self.shared.config.url)
            .field("state", &self.state())
            .field("rotating", &self.is_rotating())
            .finish()
    }
}

/// Receives notifications from one transport generation.
struct ConnectionListener {
    generation: u64,
    shared: Arc<Shared>,
}

impl ConnectionListener {
    /// Applies a state change if this listener's transport is still current.
    fn transition(&self, state: ConnectionState) -> bool {
        let mut connection = self.shared.connection.lock();
        if connection.generation != self.generation {
            return false;
        }
        connection.state = state;
        true
    }
}

#[async_trait]
impl TransportListener for ConnectionListener {
    async fn on_open(&self) {
        if self.transition(ConnectionState::Open) {
            info!(generation = self.generation, "Sockets are open");
        } else {
            debug!(generation = self.generation, "Ignoring open from a replaced connection");
        }
    }

    async fn on_message(&self, data: &[u8]) {
        if !self.shared.is_current(self.generation) {
            trace!(generation = self.generation, "Dropping frame from a replaced connection");
            return;
        }

        let frame = match Frame::decode(data) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                return;
            }
        };

        trace!(code = frame.code, "Frame received");
        *self.shared.last_frame.write() = Some(frame.clone());
        let _ = self.shared.frame_tx.send(frame);
    }

    async fn on_close(&self, reason: &str) {
        if self.transition(ConnectionState::Closed) {
            info!(generation = self.generation, reason = %reason, "Sockets are closed");
        } else {
            debug!(generation = self.generation, reason = %reason, "Replaced connection closed");
        }
    }

    async fn on_error(&self, error: &TransportError) {
        warn!(generation = self.generation, error = %error, "Transport error");
    }
}
