//! Connection configuration.
//!
//! The timings below are rate-limit accommodations for the remote service.
//! They are configurable so deployments can tune them without code changes.
//!
//! # Example Configuration
//!
//! ```yaml
//! client:
//!   url: wss://ws1.narvii.com
//!   rotation_interval_secs: 300
//!   settle_delay_ms: 1500
//!   action_delay_ms: 2200
//!   ping_interval_secs: 30
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default socket endpoint.
pub const DEFAULT_URL: &str = "wss://ws1.narvii.com";

/// Connection supervisor and action sender settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base socket URL. The signed query string is appended on every open.
    pub url: String,

    /// Whether the supervisor rotates the connection periodically.
    pub rotation_enabled: bool,

    /// Seconds between two rotations.
    pub rotation_interval_secs: u64,

    /// Milliseconds `close()` waits for the transport to settle.
    pub settle_delay_ms: u64,

    /// Milliseconds throttled room-control actions wait before sending.
    pub action_delay_ms: u64,

    /// Keep-alive ping interval in seconds (0 to disable).
    pub ping_interval_secs: u64,

    /// How many times a users-actions request reads the last frame.
    pub users_actions_attempts: u32,

    /// Milliseconds between two users-actions reads.
    pub users_actions_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            rotation_enabled: true,
            rotation_interval_secs: 300,
            settle_delay_ms: 1500,
            action_delay_ms: 2200,
            ping_interval_secs: 30,
            users_actions_attempts: 3,
            users_actions_poll_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `url` with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    /// Returns the keep-alive interval, or `None` when disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }

    pub fn users_actions_poll(&self) -> Duration {
        Duration::from_millis(self.users_actions_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_config() {
        let yaml = r#"
url: wss://example.test
rotation_interval_secs: 60
ping_interval_secs: 0
"#;

        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.url, "wss://example.test");
        assert_eq!(config.rotation_interval(), Duration::from_secs(60));
        assert_eq!(config.ping_interval(), None);

        // Untouched fields keep their defaults
        assert!(config.rotation_enabled);
        assert_eq!(config.settle_delay(), Duration::from_millis(1500));
        assert_eq!(config.action_delay(), Duration::from_millis(2200));
        assert_eq!(config.users_actions_attempts, 3);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.rotation_interval(), Duration::from_secs(300));
        assert_eq!(config.ping_interval(), Some(Duration::from_secs(30)));
    }
}
