//! HTTP transport with retries.
//!
//! # Responsibilities
//! - POST a [`RequestEnvelope`] with the standard header set
//! - Re-case bodies on the way out and on the way back
//! - Classify every outcome and drive the retry loop
//!
//! # Design Decisions
//! - One attempt in flight per logical request; retries are sequential
//! - The response body is parsed only after the correlation header is seen
//! - Budgets are measured from the envelope's start, not per attempt
//! - Each attempt is cut off when the budget in force runs out: the
//!   connectivity budget until an application retry has been scheduled

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;

use crate::casing::CaseConverter;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::resilience::{RetryClass, RetryPolicy};
use crate::transport::envelope::{RequestEnvelope, REQUEST_ID_HEADER};

/// A successful ledger response.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerResponse {
    pub status: u16,
    /// Backend correlation id from `Chain-Request-Id`.
    pub request_id: String,
    /// Camelized body; `Value::Null` for `204`.
    pub body: Value,
}

impl LedgerResponse {
    /// Decode the whole body into `T`.
    pub fn decode<T: DeserializeOwned>(mut self) -> Result<T> {
        let body = self.body.take();
        self.decode_part(body)
    }

    /// Decode a value taken from this response, keeping its correlation id.
    pub fn decode_part<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|source| Error::Json {
            status: self.status,
            request_id: Some(self.request_id.clone()),
            source,
        })
    }
}

/// Retrying JSON-over-HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_headers: HeaderMap,
    policy: RetryPolicy,
    casing: CaseConverter,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_headers: base_headers(config)?,
            policy: RetryPolicy::from_config(&config.retries),
            casing: CaseConverter::default(),
        })
    }

    /// Replace the case converter (custom exclusion lists).
    pub fn with_casing(mut self, casing: CaseConverter) -> Self {
        self.casing = casing;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send one logical request, retrying as the policy allows.
    ///
    /// The body of the returned response is camelized.
    pub async fn send(&self, envelope: &RequestEnvelope) -> Result<LedgerResponse> {
        let wire_body = self.casing.to_snake(envelope.body.clone());
        let payload = serde_json::to_vec(&wire_body)
            .map_err(|e| Error::invalid_parameters(format!("body is not serializable: {}", e)))?;

        let operation = envelope.operation();
        let mut attempt: u32 = 1;
        let mut window = RetryClass::Connectivity;

        loop {
            let remaining = self
                .policy
                .budget(window)
                .saturating_sub(envelope.started.elapsed());
            let attempt_start = Instant::now();
            let result = tokio::time::timeout(remaining, self.attempt(envelope, &payload, attempt))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        request_id: envelope.request_id.to_string(),
                        after: envelope.started.elapsed(),
                    })
                });
            metrics::record_attempt(operation, result.as_ref().map(|_| ()), attempt_start.elapsed());

            let err = match result {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let elapsed = envelope.started.elapsed();
            match self.policy.next_delay(&err, attempt, elapsed) {
                Some((class, delay)) => {
                    tracing::debug!(
                        operation,
                        attempt,
                        request_id = %envelope.request_id,
                        class = class.as_str(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying ledger request"
                    );
                    metrics::record_retry(class);
                    if class == RetryClass::Application {
                        window = class;
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    if let Some(class) = self.policy.classify(&err) {
                        tracing::warn!(
                            operation,
                            attempts = attempt,
                            request_id = %envelope.request_id,
                            class = class.as_str(),
                            elapsed_ms = elapsed.as_millis() as u64,
                            error = %err,
                            "Retry budget exhausted"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        envelope: &RequestEnvelope,
        payload: &[u8],
        attempt: u32,
    ) -> Result<LedgerResponse> {
        let response = self
            .client
            .post(&envelope.url)
            .headers(envelope.headers(&self.base_headers, attempt))
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|source| Error::Connectivity {
                request_id: envelope.request_id.to_string(),
                source,
            })?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(Error::NoRequestId {
                status: status.as_u16(),
            })?;

        if status == StatusCode::NO_CONTENT {
            return Ok(LedgerResponse {
                status: status.as_u16(),
                request_id,
                body: Value::Null,
            });
        }

        let bytes = response.bytes().await.map_err(|source| Error::Connectivity {
            request_id: request_id.clone(),
            source,
        })?;
        let mut body: Value = serde_json::from_slice(&bytes).map_err(|source| Error::Json {
            status: status.as_u16(),
            request_id: Some(request_id.clone()),
            source,
        })?;
        self.casing.camelize(&mut body);

        if status.is_success() {
            Ok(LedgerResponse {
                status: status.as_u16(),
                request_id,
                body,
            })
        } else {
            Err(Error::classify(status.as_u16(), Some(request_id), &body))
        }
    }
}

fn base_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::configuration(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::configuration(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }
    if let Some(credential) = &config.credential {
        let mut value = HeaderValue::from_str(credential)
            .map_err(|_| Error::configuration("credential is not a valid header value"))?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static("credential"), value);
    }
    Ok(headers)
}
