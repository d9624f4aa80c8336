//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transport / session / pagination produce:
//!     → tracing events (structured fields: operation, attempt, request_id)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber for the CLI or host application)
//!     → whatever metrics recorder the host application installs
//! ```

pub mod logging;
pub mod metrics;
