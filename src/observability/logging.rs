//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries embedding the client
//! - Configure log level from config, overridable by `RUST_LOG`
//!
//! # Design Decisions
//! - The library only emits `tracing` events; it never installs a
//!   subscriber on its own
//! - Credentials are never recorded as fields

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default directive when neither `RUST_LOG` nor the config set one.
fn default_directive(level: &str) -> String {
    format!("ledger_client={level},ledger_cli={level}")
}

/// Build the filter used by [`init`].
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)))
}

/// Install a global fmt subscriber. Returns `false` if one was already set.
pub fn init(config: &ObservabilityConfig) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}
