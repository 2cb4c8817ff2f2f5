//! WebSocket client transport.
//!
//! Each [`WsConnector::connect`] call spawns one task that performs the
//! upgrade, then loops over outbound messages, keep-alive ticks and inbound
//! frames until it is closed or the connection drops. It never reconnects on
//! its own: the owner decides when to open a new transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, interval_at};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{Error, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use ndc_core::{TransportError, TransportResult};

use crate::connection::{
    BoxedListener, BoxedTransport, ConnectRequest, Transport, TransportConnector,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Creates [`WsTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a new WebSocket connector.
    pub fn new() -> Self {
        Self
    }
}

impl TransportConnector for WsConnector {
    fn connect(&self, request: ConnectRequest, listener: BoxedListener) -> BoxedTransport {
        let (message_tx, message_rx) = mpsc::channel::<Vec<u8>>(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));

        let transport = Arc::new(WsTransport {
            url: request.url.clone(),
            message_tx,
            shutdown_tx,
            running: Arc::clone(&running),
        });

        tokio::spawn(run_client(request, listener, message_rx, shutdown_rx, running));

        transport
    }
}

/// Handle to one WebSocket connection.
pub struct WsTransport {
    url: String,
    message_tx: mpsc::Sender<Vec<u8>>,
    shutdown_tx: watch::Sender<bool>,
    running: Arc<AtomicBool>,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("url", &self.url)
            .field("running", &self.is_running())
            .finish()
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, data: Vec<u8>) -> TransportResult<()> {
        if !self.is_running() {
            return Err(TransportError::NotConnected);
        }
        self.message_tx
            .send(data)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Builds the upgrade request with the configured headers.
pub(crate) fn build_request(request: &ConnectRequest) -> TransportResult<Request> {
    let mut upgrade = request
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
        upgrade.headers_mut().insert(name, value);
    }

    Ok(upgrade)
}

/// State of one running client loop.
struct ClientLoopState {
    listener: BoxedListener,
    url: String,
    running: Arc<AtomicBool>,
    ws_tx: WsSink,
    ws_rx: WsSource,
    close_reason: String,
}

impl ClientLoopState {
    /// Forwards inbound data unless the transport is being closed.
    async fn handle_message_received(&mut self, message_type: &str, data: &[u8]) {
        if !self.running.load(Ordering::SeqCst) {
            trace!(url = %self.url, "Dropping frame received after close");
            return;
        }
        trace!(url = %self.url, len = data.len(), message_type = message_type, "Received");
        self.listener.on_message(data).await;
    }

    /// Handles one item from the socket.
    /// Returns true if should continue loop, false if should break.
    async fn handle_message(&mut self, msg: Option<Result<Message, Error>>) -> bool {
        match msg {
            Some(Ok(Message::Text(text))) => {
                self.handle_message_received("text", text.as_bytes()).await;
                true
            }
            Some(Ok(Message::Binary(data))) => {
                self.handle_message_received("binary", &data).await;
                true
            }
            Some(Ok(Message::Ping(data))) => {
                trace!(url = %self.url, "Received ping, sending pong");
                let _ = self.ws_tx.send(Message::Pong(data)).await;
                true
            }
            Some(Ok(Message::Pong(_))) => {
                trace!(url = %self.url, "Received pong");
                true
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = frame.as_ref().map_or("", |f| f.reason.as_str());
                info!(url = %self.url, reason = %reason, "Server closed connection");
                self.close_reason = format!("closed by server: {reason}");
                false
            }
            Some(Ok(Message::Frame(_))) => true,
            Some(Err(e)) => {
                warn!(url = %self.url, error = %e, "WebSocket error");
                let error = TransportError::ConnectionClosed {
                    reason: e.to_string(),
                };
                self.listener.on_error(&error).await;
                self.close_reason = error.to_string();
                false
            }
            None => {
                info!(url = %self.url, "WebSocket stream ended");
                self.close_reason = "stream ended".to_string();
                false
            }
        }
    }

    /// Sends a keep-alive ping.
    async fn send_ping(&mut self) {
        trace!(url = %self.url, "Sending keep-alive ping");
        if let Err(e) = self.ws_tx.send(Message::Ping(Default::default())).await {
            warn!(url = %self.url, error = %e, "Failed to send ping");
        }
    }
}

/// Waits for the next keep-alive tick, or forever when keep-alive is off.
async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Connects, then runs the send/receive loop until closed.
async fn run_client(
    request: ConnectRequest,
    listener: BoxedListener,
    mut message_rx: mpsc::Receiver<Vec<u8>>,
    mut shutdown_rx: watch::Receiver<bool>,
    running: Arc<AtomicBool>,
) {
    let url = request.url.clone();

    let upgrade = match build_request(&request) {
        Ok(upgrade) => upgrade,
        Err(e) => {
            warn!(url = %url, error = %e, "Invalid WebSocket request");
            running.store(false, Ordering::SeqCst);
            listener.on_error(&e).await;
            listener.on_close(&e.to_string()).await;
            return;
        }
    };

    info!(url = %url, "Connecting to WebSocket server");

    let connected = tokio::select! {
        _ = shutdown_rx.changed() => None,
        result = connect_async(upgrade) => Some(result),
    };

    let ws_stream = match connected {
        None => {
            debug!(url = %url, "Closed before the connection was established");
            running.store(false, Ordering::SeqCst);
            listener.on_close("closed by client").await;
            return;
        }
        Some(Err(e)) => {
            let error = TransportError::ConnectionFailed {
                url: url.clone(),
                reason: format!("WebSocket connection failed: {e}"),
            };
            warn!(url = %url, error = %error, "WebSocket connection failed");
            running.store(false, Ordering::SeqCst);
            listener.on_error(&error).await;
            listener.on_close(&error.to_string()).await;
            return;
        }
        Some(Ok((ws_stream, _response))) => ws_stream,
    };

    info!(url = %url, "WebSocket client connected");
    listener.on_open().await;

    let (ws_tx, ws_rx) = ws_stream.split();
    let mut state = ClientLoopState {
        listener,
        url,
        running,
        ws_tx,
        ws_rx,
        close_reason: String::new(),
    };

    let mut keep_alive = request
        .ping_interval
        .map(|period| interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            // A dropped handle counts as a shutdown request
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!(url = %state.url, "WebSocket client shutting down");
                    let _ = state.ws_tx.close().await;
                    state.close_reason = "closed by client".to_string();
                    break;
                }
            }

            Some(data) = message_rx.recv() => {
                let msg = Message::Text(String::from_utf8_lossy(&data).to_string().into());
                if let Err(e) = state.ws_tx.send(msg).await {
                    warn!(url = %state.url, error = %e, "Failed to send message");
                }
            }

            _ = next_tick(&mut keep_alive) => {
                state.send_ping().await;
            }

            msg = state.ws_rx.next() => {
                if !state.handle_message(msg).await {
                    break;
                }
            }
        }
    }

    state.running.store(false, Ordering::SeqCst);
    state.listener.on_close(&state.close_reason).await;
}
