//! Client library for a hosted ledger service.
//!
//! ```text
//! Client ─┬─ api facades (accounts, transactions, balances, ...)
//!         │      └─ TransactionBuilder, Query / Page / Items
//!         └─ transport::Connection
//!                ├─ SessionResolver (/hello, cached ledger URL)
//!                └─ HttpTransport (casing, headers, retries, error classification)
//! ```
//!
//! ```rust,ignore
//! use ledger_client::{Client, ClientConfig, IssueParams, QueryParams};
//!
//! let client = Client::new(ClientConfig::new("my-ledger").with_credential(secret))?;
//! client
//!     .transactions()
//!     .transact(|b| {
//!         b.issue(IssueParams::new("usd", 100, "alice"))?;
//!         Ok(())
//!     })
//!     .await?;
//! let accounts = client.accounts().list(QueryParams::default())?.collect_all().await?;
//! ```

pub mod api;
pub mod casing;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod pagination;
pub mod resilience;
pub mod schema;
pub mod transport;

pub use api::{
    AmountInput, BalanceParams, CreateRequest, IssueParams, QueryParams, RetireParams, SumParams,
    TransactionBuilder, TransferParams, UpdateTagsRequest,
};
pub use client::Client;
pub use config::schema::ClientConfig;
pub use error::{ApiError, Error, ErrorKind, Result};
pub use pagination::{Items, Page, PageParams, Query};
