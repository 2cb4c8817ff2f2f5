//! # ndc Runtime
//!
//! Everything around an [`ndc_client::Client`] that a long-running process
//! needs:
//!
//! - [`config`]: layered loading from files, environment and code
//! - [`logging`]: `tracing` subscriber setup from configuration
//! - [`NdcRuntime`]: builds the client and runs it until Ctrl+C or SIGTERM
//!
//! ## Feature Flags
//!
//! - `toml-config`: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log format
//! - `ws-client`: WebSocket transport as the default connector
//!
//! ```ignore
//! use ndc_runtime::NdcRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = NdcRuntime::builder().build()?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, CredentialsConfig, LoggingConfig, NdcConfig, Profile,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{NdcRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and `Level`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
