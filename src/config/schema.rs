//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for a ledger client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Ledger name (alias or id) to resolve on first request.
    pub ledger_name: String,

    /// API credential. Sent in the `Credential` header, never logged.
    pub credential: Option<String>,

    /// Base URL of the API host that answers the session handshake.
    pub api_url: String,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Session/address resolution settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Extra headers attached to every request.
    pub headers: BTreeMap<String, String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ledger_name: String::new(),
            credential: None,
            api_url: "https://api.seq.com".to_string(),
            retries: RetryConfig::default(),
            session: SessionConfig::default(),
            timeouts: TimeoutConfig::default(),
            headers: BTreeMap::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for `ledger_name` with every other field defaulted.
    pub fn new(ledger_name: impl Into<String>) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            ..Self::default()
        }
    }

    /// Set the API credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Set the handshake host URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay after the first failed attempt; doubles per attempt.
    pub base_delay_ms: u64,

    /// Cap on any single backoff delay.
    pub max_delay_ms: u64,

    /// Budget for connectivity-class retries, measured from the first attempt.
    pub connectivity_timeout_ms: u64,

    /// Budget for backend-flagged retriable errors.
    pub retriable_timeout_ms: u64,

    /// Error codes never retried, even when the backend flags them retriable.
    pub non_retriable_codes: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 40,
            max_delay_ms: 20_000,
            connectivity_timeout_ms: 5_000,
            retriable_timeout_ms: 120_000, // two minutes
            non_retriable_codes: Vec::new(),
        }
    }
}

/// Session resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long before expiry a background refresh is started.
    pub refresh_window_secs: u64,

    /// TTL used when the handshake response does not carry one.
    pub default_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_window_secs: 60,
            default_ttl_secs: 300,
        }
    }
}

/// Timeout configuration for HTTP attempts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,

    /// Whole-attempt timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "https://api.seq.com");
        assert_eq!(config.retries.base_delay_ms, 40);
        assert_eq!(config.retries.max_delay_ms, 20_000);
        assert_eq!(config.retries.connectivity_timeout_ms, 5_000);
        assert_eq!(config.retries.retriable_timeout_ms, 120_000);
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            ledger_name = "test"

            [retries]
            connectivity_timeout_ms = 250

            [headers]
            X-Team = "ops"
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger_name, "test");
        assert_eq!(config.retries.connectivity_timeout_ms, 250);
        assert_eq!(config.retries.base_delay_ms, 40);
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("ops"));
    }
}
