//! Metrics collection.
//!
//! # Metrics
//! - `ledger_requests_total` (counter): attempts by operation and outcome
//! - `ledger_request_duration_seconds` (histogram): per-attempt latency
//! - `ledger_retries_total` (counter): retries by class
//! - `ledger_session_refresh_total` (counter): handshakes by mode and result
//!
//! # Design Decisions
//! - Emits through the `metrics` facade only; installing a recorder or
//!   exporter is left to the application
//! - Labels are low-cardinality (operation name, never ids)

use std::time::Duration;

use crate::error::Error;
use crate::resilience::RetryClass;

/// Record one HTTP attempt.
pub fn record_attempt(operation: &str, outcome: Result<(), &Error>, duration: Duration) {
    let outcome = match outcome {
        Ok(()) => "ok",
        Err(e) => e.kind().name(),
    };
    metrics::counter!(
        "ledger_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "ledger_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a retry about to be scheduled.
pub fn record_retry(class: RetryClass) {
    metrics::counter!("ledger_retries_total", "class" => class.as_str()).increment(1);
}

/// Record a session handshake.
pub fn record_session_refresh(background: bool, success: bool) {
    let mode = if background { "background" } else { "foreground" };
    let result = if success { "ok" } else { "error" };
    metrics::counter!(
        "ledger_session_refresh_total",
        "mode" => mode,
        "result" => result
    )
    .increment(1);
}
