//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt fails:
//!     → retries.rs (classify: connectivity / application / terminal)
//!     → backoff.rs (capped exponential delay + jitter)
//!     → retries.rs (refuse if elapsed + delay exceeds the class budget)
//!     → sleep, then the next attempt reuses the same idempotency key
//! ```

pub mod backoff;
pub mod retries;

pub use retries::{RetryClass, RetryPolicy};
