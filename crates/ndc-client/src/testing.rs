//! Recording transport doubles for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use ndc_core::{EventRegistry, Frame, TransportError, TransportResult};
use ndc_transport::{BoxedListener, BoxedTransport, ConnectRequest, Transport, TransportConnector};

use crate::config::ClientConfig;
use crate::credentials::StaticCredentials;
use crate::dispatch::Dispatcher;
use crate::supervisor::Supervisor;

pub(crate) struct MockTransport {
    running: AtomicBool,
    log: Arc<Mutex<Vec<&'static str>>>,
    sent: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, data: Vec<u8>) -> TransportResult<()> {
        if !self.is_running() {
            return Err(TransportError::NotConnected);
        }
        self.sent.lock().push(data);
        Ok(())
    }

    async fn close(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.log.lock().push("close");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Records every connect and hands out [`MockTransport`]s.
#[derive(Default)]
pub(crate) struct MockConnector {
    log: Arc<Mutex<Vec<&'static str>>>,
    requests: Mutex<Vec<ConnectRequest>>,
    listeners: Mutex<Vec<BoxedListener>>,
    transports: Mutex<Vec<Arc<MockTransport>>>,
}

impl MockConnector {
    /// `"connect"` / `"close"` in call order.
    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.log.lock().clone()
    }

    pub(crate) fn request(&self, index: usize) -> ConnectRequest {
        self.requests.lock()[index].clone()
    }

    pub(crate) fn listener(&self, index: usize) -> BoxedListener {
        Arc::clone(&self.listeners.lock()[index])
    }

    /// Every frame sent on any transport, in order.
    pub(crate) fn sent_frames(&self) -> Vec<Frame> {
        self.transports
            .lock()
            .iter()
            .flat_map(|t| t.sent.lock().clone())
            .map(|data| Frame::decode(&data).unwrap())
            .collect()
    }
}

impl TransportConnector for MockConnector {
    fn connect(&self, request: ConnectRequest, listener: BoxedListener) -> BoxedTransport {
        self.log.lock().push("connect");
        self.requests.lock().push(request);
        self.listeners.lock().push(listener);

        let transport = Arc::new(MockTransport {
            running: AtomicBool::new(true),
            log: Arc::clone(&self.log),
            sent: Mutex::new(Vec::new()),
        });
        self.transports.lock().push(Arc::clone(&transport));
        transport
    }
}

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig::new("wss://ws1.example.test")
}

/// A supervisor wired to a fresh mock connector and registry.
pub(crate) fn mock_supervisor(config: ClientConfig) -> (Supervisor, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::default());
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(EventRegistry::new())));
    let supervisor = Supervisor::new(
        config,
        Arc::clone(&connector) as Arc<dyn TransportConnector>,
        Arc::new(StaticCredentials::new("device", "token")),
        dispatcher,
    );
    (supervisor, connector)
}
