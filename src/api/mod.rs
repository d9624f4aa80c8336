//! Resource facades.
//!
//! # Data Flow
//! ```text
//! client.accounts().create(params)
//!     → validator field rules → SchemaValidator → Connection::request
//!     → typed record
//!
//! client.accounts().list(params)
//!     → Query<Account> → page() / all()
//! ```

pub mod accounts;
pub mod actions;
pub mod amount;
pub mod balances;
pub mod builder;
pub mod dev_utils;
pub mod feeds;
pub mod flavors;
pub mod indexes;
pub mod keys;
pub mod stats;
pub mod tokens;
pub mod transactions;
pub mod types;

pub use accounts::Accounts;
pub use actions::Actions;
pub use amount::{Amount, AmountInput, MAX_AMOUNT, MAX_SAFE_INTEGER};
pub use balances::Balances;
pub use builder::{ActionType, IssueParams, PendingAction, RetireParams, TransactionBuilder, TransferParams};
pub use dev_utils::DevUtils;
pub use feeds::Feeds;
pub use flavors::Flavors;
pub use indexes::Indexes;
pub use keys::Keys;
pub use stats::StatsApi;
pub use tokens::Tokens;
pub use transactions::Transactions;
pub use types::*;
