//! Ledger session resolution.
//!
//! # Responsibilities
//! - Resolve a ledger name to its backend URL through the `/hello` handshake
//! - Cache the result until its TTL runs out
//! - Refresh in the background shortly before expiry
//!
//! # Design Decisions
//! - The session is published through `ArcSwapOption`; readers always see a
//!   complete `{url, deadline}` pair
//! - A single async mutex guards handshakes: cold-cache callers queue on it
//!   and re-check the cache once they hold it, so N concurrent first requests
//!   cost one handshake
//! - Background refreshes use `try_lock_owned` and never queue
//! - A failed background refresh keeps the still-valid cached session

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::transport::envelope::RequestEnvelope;
use crate::transport::http::HttpTransport;

/// Longest lifetime accepted for a session, whatever the handshake says.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A resolved ledger address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSession {
    /// Base URL for all ledger operations, without trailing slash.
    pub ledger_url: String,
    /// The session must not be used at or after this instant.
    pub deadline: Instant,
    /// A background refresh is started at or after this instant.
    pub refresh_at: Instant,
}

impl LedgerSession {
    fn new(ledger_url: String, ttl: Duration, refresh_window: Duration, now: Instant) -> Self {
        let ttl = ttl.min(MAX_SESSION_TTL);
        let deadline = now.checked_add(ttl).unwrap_or(now);
        // Short TTLs would otherwise sit permanently inside the window.
        let lead = refresh_window.min(ttl / 2);
        Self {
            ledger_url,
            deadline,
            refresh_at: deadline.checked_sub(lead).unwrap_or(now),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        now >= self.refresh_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HelloResponse {
    addr: String,
    #[serde(default)]
    addr_ttl_seconds: Option<u64>,
    #[serde(default)]
    team_name: Option<String>,
}

/// Single-flight resolver for the ledger session.
#[derive(Clone)]
pub struct SessionResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    transport: HttpTransport,
    api_url: String,
    scheme: String,
    ledger_name: String,
    refresh_window: Duration,
    default_ttl: Duration,
    current: ArcSwapOption<LedgerSession>,
    refresh_lock: Arc<Mutex<()>>,
}

impl SessionResolver {
    pub fn new(config: &ClientConfig, transport: HttpTransport) -> Result<Self> {
        let api_url = url::Url::parse(&config.api_url)
            .map_err(|e| Error::configuration(format!("invalid api_url: {}", e)))?;

        Ok(Self {
            inner: Arc::new(ResolverInner {
                transport,
                api_url: config.api_url.trim_end_matches('/').to_string(),
                scheme: api_url.scheme().to_string(),
                ledger_name: config.ledger_name.clone(),
                refresh_window: Duration::from_secs(config.session.refresh_window_secs),
                default_ttl: Duration::from_secs(config.session.default_ttl_secs),
                current: ArcSwapOption::empty(),
                refresh_lock: Arc::new(Mutex::new(())),
            }),
        })
    }

    /// Current session, performing a handshake if there is none or it expired.
    pub async fn resolve(&self) -> Result<Arc<LedgerSession>> {
        if let Some(session) = self.inner.current.load_full() {
            let now = Instant::now();
            if !session.is_expired(now) {
                if session.needs_refresh(now) {
                    self.spawn_refresh();
                }
                return Ok(session);
            }
        }

        let _guard = self.inner.refresh_lock.lock().await;
        if let Some(session) = self.inner.current.load_full() {
            if !session.is_expired(Instant::now()) {
                return Ok(session);
            }
        }
        self.inner.refresh(false).await
    }

    /// Drop the cached session; the next request performs a handshake.
    pub fn invalidate(&self) {
        self.inner.current.store(None);
    }

    /// Cached session without triggering any handshake.
    pub fn current(&self) -> Option<Arc<LedgerSession>> {
        self.inner.current.load_full()
    }

    fn spawn_refresh(&self) {
        let Ok(guard) = self.inner.refresh_lock.clone().try_lock_owned() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _guard = guard;
            if let Some(session) = inner.current.load_full() {
                if !session.needs_refresh(Instant::now()) {
                    return;
                }
            }
            if let Err(e) = inner.refresh(true).await {
                tracing::warn!(
                    ledger = %inner.ledger_name,
                    error = %e,
                    "Background session refresh failed; keeping cached session"
                );
            }
        });
    }
}

impl ResolverInner {
    async fn refresh(&self, background: bool) -> Result<Arc<LedgerSession>> {
        let result = self.handshake().await;
        metrics::record_session_refresh(background, result.is_ok());

        let session = Arc::new(result?);
        tracing::info!(
            ledger = %self.ledger_name,
            ledger_url = %session.ledger_url,
            background,
            "Ledger session established"
        );
        self.current.store(Some(Arc::clone(&session)));
        Ok(session)
    }

    async fn handshake(&self) -> Result<LedgerSession> {
        let envelope = RequestEnvelope::new(
            format!("{}/hello", self.api_url),
            json!({ "ledgerName": self.ledger_name }),
        );
        tracing::debug!(ledger = %self.ledger_name, request_id = %envelope.request_id, "Session handshake");

        let hello: HelloResponse = self.transport.send(&envelope).await?.decode()?;

        let ttl = hello
            .addr_ttl_seconds
            .filter(|ttl| *ttl > 0)
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);

        Ok(LedgerSession::new(
            ledger_url(&self.scheme, &hello, &self.ledger_name),
            ttl,
            self.refresh_window,
            Instant::now(),
        ))
    }
}

fn ledger_url(scheme: &str, hello: &HelloResponse, ledger_name: &str) -> String {
    let addr = hello.addr.trim_end_matches('/');
    match hello.team_name.as_deref().filter(|t| !t.is_empty()) {
        Some(team) => format!("{}://{}/{}/{}", scheme, addr, team, ledger_name),
        None => format!("{}://{}/{}", scheme, addr, ledger_name),
    }
}
