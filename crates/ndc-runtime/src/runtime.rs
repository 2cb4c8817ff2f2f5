//! Process lifecycle for a configured client.
//!
//! ```rust,ignore
//! use ndc_runtime::NdcRuntime;
//!
//! let runtime = NdcRuntime::builder()
//!     .config_file("config/ndc.toml")
//!     .profile("production")
//!     .signer(|data| my_sign(data))
//!     .build()?;
//!
//! runtime.client().on(EventKind::TextMessage, |value| async move { Ok(()) });
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ndc_client::{Client, CredentialProvider, Signer};
use ndc_transport::TransportConnector;
use tokio::signal;
use tracing::{info, warn};

use crate::config::{ConfigLoader, NdcConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A [`Client`] built from configuration, run until shutdown.
pub struct NdcRuntime {
    config: NdcConfig,
    client: Client,
    running: AtomicBool,
}

impl NdcRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Initializes logging, validates `config` and builds the client with
    /// the default connector.
    pub fn from_config(config: NdcConfig) -> RuntimeResult<Self> {
        Self::assemble(config, ClientParts::default())
    }

    /// Like [`from_config`](Self::from_config) with an explicit connector.
    pub fn with_connector(
        config: NdcConfig,
        connector: Arc<dyn TransportConnector>,
    ) -> RuntimeResult<Self> {
        Self::assemble(
            config,
            ClientParts {
                connector: Some(connector),
                ..Default::default()
            },
        )
    }

    fn assemble(config: NdcConfig, parts: ClientParts) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        validate_config(&config)?;

        let credentials: Arc<dyn CredentialProvider> = match parts.credentials {
            Some(credentials) => credentials,
            None => {
                let mut provider = config.credentials.to_provider()?;
                match parts.signer {
                    Some(signer) => provider = provider.with_signer(move |data| signer(data)),
                    None => warn!("No signer set, connecting without a signature header"),
                }
                Arc::new(provider)
            }
        };

        let mut builder = Client::builder()
            .config(config.client.clone())
            .shared_credentials(credentials);
        if let Some(connector) = parts.connector {
            builder = builder.connector(connector);
        }
        let client = builder.build()?;

        info!(
            log_level = %config.logging.level,
            url = %config.client.url,
            rotation_enabled = config.client.rotation_enabled,
            rotation_interval_secs = config.client.rotation_interval_secs,
            "Runtime initialized"
        );

        Ok(Self {
            config,
            client,
            running: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &NdcConfig {
        &self.config
    }

    /// The client, for registering callbacks and sending actions.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Opens the connection and starts rotation.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Runtime is already running");
            return;
        }
        self.client.open();
        info!("Runtime started");
    }

    /// Stops rotation and closes the connection.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Runtime is not running");
            return;
        }
        self.client.shutdown().await;
        info!("Runtime stopped");
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start();
        info!("ndc runtime is now running. Press Ctrl+C to stop.");

        let signal = wait_for_shutdown().await;
        self.stop().await;

        Ok(signal?)
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start();
        shutdown.await;
        self.stop().await;
        Ok(())
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Client pieces that come from code rather than configuration.
#[derive(Default)]
struct ClientParts {
    connector: Option<Arc<dyn TransportConnector>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    signer: Option<Signer>,
}

/// Builder loading an [`NdcRuntime`] from configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    parts: ClientParts,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            parts: ClientParts::default(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: NdcConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `connector` instead of the default transport.
    pub fn connector(mut self, connector: Arc<dyn TransportConnector>) -> Self {
        self.parts.connector = Some(connector);
        self
    }

    /// Signs each connection's `signbody` with `signer`, using the
    /// configured device ID and session token.
    pub fn signer<F>(mut self, signer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.parts.signer = Some(Arc::new(signer));
        self
    }

    /// Uses `credentials` instead of the `[credentials]` section.
    ///
    /// Takes precedence over [`signer`](Self::signer).
    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.parts.credentials = Some(Arc::new(credentials));
        self
    }

    pub fn build(self) -> RuntimeResult<NdcRuntime> {
        let config = self.config_loader.load()?;
        NdcRuntime::assemble(config, self.parts)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
