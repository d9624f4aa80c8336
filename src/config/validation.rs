//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays and budgets > 0, base <= max)
//! - Check that URLs and header names are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::ClientConfig;
use crate::transport::session::MAX_SESSION_TTL;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ledger_name.trim().is_empty() {
        errors.push(ValidationError::new("ledger_name", "must not be empty"));
    }

    match Url::parse(&config.api_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.host_str().is_none() {
                errors.push(ValidationError::new("api_url", "must include a host"));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "api_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api_url", e.to_string())),
    }

    let retries = &config.retries;
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::new("retries.base_delay_ms", "must be > 0"));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            "must be >= retries.base_delay_ms",
        ));
    }
    if retries.connectivity_timeout_ms == 0 {
        errors.push(ValidationError::new("retries.connectivity_timeout_ms", "must be > 0"));
    }
    if retries.retriable_timeout_ms == 0 {
        errors.push(ValidationError::new("retries.retriable_timeout_ms", "must be > 0"));
    }

    let max_ttl_secs = MAX_SESSION_TTL.as_secs();
    if config.session.default_ttl_secs == 0 {
        errors.push(ValidationError::new("session.default_ttl_secs", "must be > 0"));
    } else if config.session.default_ttl_secs > max_ttl_secs {
        errors.push(ValidationError::new(
            "session.default_ttl_secs",
            format!("must be <= {}", max_ttl_secs),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("headers.{}", name),
                "invalid header name",
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                format!("headers.{}", name),
                "invalid header value",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
