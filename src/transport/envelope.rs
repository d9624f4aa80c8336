//! Request envelope and standard headers.
//!
//! # Responsibilities
//! - Generate the idempotency key and request id of a logical request
//! - Carry the original start time through every retry
//! - Produce the per-attempt header set

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

/// Response header carrying the backend's correlation id.
pub const REQUEST_ID_HEADER: &str = "Chain-Request-Id";
/// Request header carrying `<request-id>/<attempt>`.
pub const ATTEMPT_HEADER: &str = "Chain-Request-Attempt";
/// Request header carrying the idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
/// Request header carrying the API credential.
pub const CREDENTIAL_HEADER: &str = "Credential";

/// User-Agent string for the client.
pub const CLIENT_USER_AGENT: &str = concat!("ledger-client/", env!("CARGO_PKG_VERSION"));

/// One logical request. Immutable; attempts are numbered outside it.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    /// Absolute URL of the endpoint.
    pub url: String,
    /// Body with local (camelCase) keys.
    pub body: Value,
    /// Stable across all attempts of this request.
    pub idempotency_key: Uuid,
    /// Client-side correlation id.
    pub request_id: Uuid,
    /// Start of the first attempt.
    pub started: Instant,
}

impl RequestEnvelope {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            body: if body.is_null() { Value::Object(Default::default()) } else { body },
            idempotency_key: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    /// Last path segment of the URL, used as the operation label.
    pub fn operation(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }

    /// Value of the attempt header for attempt `attempt` (1-based).
    pub fn attempt_id(&self, attempt: u32) -> String {
        format!("{}/{}", self.request_id, attempt)
    }

    /// Full header set for one attempt.
    ///
    /// `base` holds configured extra headers and the credential; the
    /// standard headers are applied on top of it.
    pub fn headers(&self, base: &HeaderMap, attempt: u32) -> HeaderMap {
        let mut headers = base.clone();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        // Uuid text is always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&self.idempotency_key.to_string()) {
            headers.insert(HeaderName::from_static("idempotency-key"), value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.attempt_id(attempt)) {
            headers.insert(HeaderName::from_static("chain-request-attempt"), value);
        }
        headers
    }
}
