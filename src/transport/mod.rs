//! Request pipeline to the ledger backend.
//!
//! # Data Flow
//! ```text
//! Connection::request(path, body)
//!     → session.rs (resolve ledger URL, single-flight handshake)
//!     → envelope.rs (idempotency key, request id, start time)
//!     → http.rs (snakeize → POST → correlation check → parse → camelize)
//!         ↳ on failure: resilience::RetryPolicy decides delay or surrender
//!     → caller (Value, or a classified Error)
//! ```

pub mod connection;
pub mod envelope;
pub mod http;
pub mod session;

pub use connection::Connection;
pub use envelope::RequestEnvelope;
pub use http::{HttpTransport, LedgerResponse};
pub use session::{LedgerSession, SessionResolver, MAX_SESSION_TTL};
