//! Configuration module for ndc clients.
//!
//! Layered loading with figment, the configuration schema and validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CredentialsConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, NdcConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
