//! Retry decisions for ledger requests.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is retryable and under which budget
//! - Compute the next backoff delay
//! - Refuse a retry whose delay would overrun the class budget
//!
//! # Design Decisions
//! - Retries are safe for POST because every logical request carries one
//!   idempotency key for all of its attempts
//! - Connectivity failures get a short budget; backend-flagged retriable
//!   errors get a long one
//! - Local validation and unparsable responses are never retried

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{Error, ErrorKind};
use crate::resilience::backoff::Backoff;

/// Which time budget a retry is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryClass {
    /// No usable response: transport failure or missing correlation header.
    Connectivity,
    /// The backend answered and asked to be retried.
    Application,
}

impl RetryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryClass::Connectivity => "connectivity",
            RetryClass::Application => "application",
        }
    }
}

/// Retry policy derived from [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    backoff: Backoff,
    connectivity_budget: Duration,
    application_budget: Duration,
    non_retriable_codes: Vec<String>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            backoff: Backoff::new(config.base_delay_ms, config.max_delay_ms),
            connectivity_budget: Duration::from_millis(config.connectivity_timeout_ms),
            application_budget: Duration::from_millis(config.retriable_timeout_ms),
            non_retriable_codes: config.non_retriable_codes.clone(),
        }
    }

    /// Retry class for an error, or `None` if it must surface immediately.
    pub fn classify(&self, err: &Error) -> Option<RetryClass> {
        match err.kind() {
            ErrorKind::Connectivity | ErrorKind::NoRequestId => Some(RetryClass::Connectivity),
            ErrorKind::NotFound | ErrorKind::BadRequest | ErrorKind::Server => {
                let blocked = err
                    .code()
                    .map(|code| self.non_retriable_codes.iter().any(|c| c == code))
                    .unwrap_or(false);
                (err.is_backend_retriable() && !blocked).then_some(RetryClass::Application)
            }
            _ => None,
        }
    }

    /// Total time a logical request may spend retrying under `class`.
    pub fn budget(&self, class: RetryClass) -> Duration {
        match class {
            RetryClass::Connectivity => self.connectivity_budget,
            RetryClass::Application => self.application_budget,
        }
    }

    /// Delay before attempt `attempt + 1`, given time already spent.
    ///
    /// Returns `None` when the error is terminal or the budget would be
    /// exceeded by sleeping.
    pub fn next_delay(
        &self,
        err: &Error,
        attempt: u32,
        elapsed: Duration,
    ) -> Option<(RetryClass, Duration)> {
        let class = self.classify(err)?;
        let delay = self.backoff.delay(attempt);
        if elapsed.saturating_add(delay) >= self.budget(class) {
            return None;
        }
        Some((class, delay))
    }
}
