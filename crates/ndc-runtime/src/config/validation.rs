//! Configuration validation.

use ndc_client::ClientConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, NdcConfig};

/// Validates the entire configuration.
///
/// Credentials are not checked here; they are resolved when the client is
/// built so a config file without secrets still validates.
pub fn validate_config(config: &NdcConfig) -> ConfigResult<()> {
    validate_client_config(&config.client)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_client_config(client: &ClientConfig) -> ConfigResult<()> {
    validate_socket_url(&client.url)?;

    if client.rotation_enabled && client.rotation_interval_secs == 0 {
        return Err(ConfigError::validation(
            "Rotation interval must be greater than 0 when rotation is enabled",
        ));
    }

    if client.users_actions_attempts == 0 {
        return Err(ConfigError::validation(
            "users_actions_attempts must be at least 1",
        ));
    }

    Ok(())
}

fn validate_socket_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::invalid_url(url, "URL cannot be empty"));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ConfigError::invalid_url(url, "missing scheme"));
    };
    if scheme != "ws" && scheme != "wss" {
        return Err(ConfigError::invalid_url(
            url,
            "URL must start with ws:// or wss://",
        ));
    }
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid_url(url, "missing host"));
    }
    if rest.contains('?') {
        return Err(ConfigError::invalid_url(
            url,
            "query string is appended on connect and must not be set",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter module name: {module:?}"
        )));
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&NdcConfig::default()).is_ok());
    }

    #[test]
    fn test_socket_url() {
        assert!(validate_socket_url("wss://ws1.narvii.com").is_ok());
        assert!(validate_socket_url("ws://127.0.0.1:9000").is_ok());

        for url in [
            "",
            "ws1.narvii.com",
            "https://ws1.narvii.com",
            "wss://",
            "wss://ws1.narvii.com/?signbody=x",
        ] {
            assert!(
                matches!(validate_socket_url(url), Err(ConfigError::InvalidUrl { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_rotation_interval() {
        let mut config = NdcConfig::default();
        config.client.rotation_interval_secs = 0;
        assert!(validate_config(&config).is_err());

        config.client.rotation_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = NdcConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some("logs/ndc.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_filter_module() {
        let mut config = NdcConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
