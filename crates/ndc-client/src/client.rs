//! The client facade.
//!
//! A [`Client`] composes the pieces of the crate: one [`EventRegistry`], one
//! [`Dispatcher`] over it, one [`Supervisor`] owning the connection and one
//! [`ActionSender`] for outbound control messages.
//!
//! ```rust,ignore
//! use ndc_client::{Client, StaticCredentials};
//! use ndc_core::EventKind;
//!
//! let client = Client::builder()
//!     .credentials(StaticCredentials::new(device_id, sid))
//!     .build()?;
//!
//! client.on(EventKind::TextMessage, |value| async move {
//!     println!("{:?}", value.as_chat().and_then(|c| c.content()));
//!     Ok(())
//! });
//!
//! client.open();
//! ```

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use ndc_core::{Callback, EventKind, EventRegistry, EventValue, Frame, TransportResult};
use ndc_transport::TransportConnector;

use crate::actions::{ActionSender, Presence};
use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::dispatch::Dispatcher;
use crate::supervisor::{ConnectionState, Supervisor};

/// Errors raised while assembling a [`Client`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no credentials provided")]
    MissingCredentials,

    #[error("no transport connector provided and the `ws-client` feature is disabled")]
    MissingConnector,
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Option<Arc<dyn CredentialProvider>>,
    connector: Option<Arc<dyn TransportConnector>>,
    registry: Option<Arc<EventRegistry>>,
}

impl ClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Uses an already shared provider.
    pub fn shared_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn TransportConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Uses an existing registry, e.g. one shared with other clients.
    pub fn registry(mut self, registry: Arc<EventRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Client, BuildError> {
        let credentials = self.credentials.ok_or(BuildError::MissingCredentials)?;
        let connector = match self.connector {
            Some(connector) => connector,
            None => default_connector()?,
        };
        let registry = self.registry.unwrap_or_default();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        let supervisor = Supervisor::new(self.config, connector, credentials, dispatcher);

        Ok(Client {
            registry,
            actions: ActionSender::new(supervisor.clone()),
            supervisor,
        })
    }
}

#[cfg(feature = "ws-client")]
fn default_connector() -> Result<Arc<dyn TransportConnector>, BuildError> {
    Ok(Arc::new(ndc_transport::WsConnector::new()))
}

#[cfg(not(feature = "ws-client"))]
fn default_connector() -> Result<Arc<dyn TransportConnector>, BuildError> {
    Err(BuildError::MissingConnector)
}

/// A supervised chat socket client.
#[derive(Debug)]
pub struct Client {
    registry: Arc<EventRegistry>,
    supervisor: Supervisor,
    actions: ActionSender,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Registers a callback for `event` and returns it.
    pub fn on<F, Fut>(&self, event: EventKind, f: F) -> Callback
    where
        F: Fn(EventValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.registry.register(event, f)
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn actions(&self) -> &ActionSender {
        &self.actions
    }

    /// Presence builder for a community and chat.
    pub fn presence(&self, community: i64, chat: impl Into<String>) -> Presence<'_> {
        self.actions.presence(community, chat)
    }

    /// Opens the connection and starts rotation.
    pub fn open(&self) {
        self.supervisor.open(true);
    }

    pub async fn close(&self) {
        self.supervisor.close().await;
    }

    /// Stops rotation and closes the connection.
    pub async fn shutdown(&self) {
        self.supervisor.shutdown().await;
    }

    pub async fn send(&self, frame: &Frame) -> TransportResult<()> {
        self.supervisor.send(frame).await
    }

    /// The last frame received, if any.
    pub fn receive(&self) -> Option<Frame> {
        self.supervisor.receive()
    }

    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn is_open(&self) -> bool {
        self.supervisor.is_open()
    }

    pub fn status(&self) -> &'static str {
        self.supervisor.status()
    }
}
