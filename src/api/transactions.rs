//! Transactions.
//!
//! Two submission paths share one [`TransactionBuilder`]:
//! ```text
//! transact(|b| ...)                 → /transact
//! build(&b) → sign(tpl) → submit()  → /build-transaction, /sign-transaction, /submit-transaction
//! ```

use serde_json::{json, Value};

use crate::api::builder::TransactionBuilder;
use crate::api::types::{QueryParams, Transaction};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Transactions<'a> {
    client: &'a Client,
}

impl<'a> Transactions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self, params: QueryParams) -> Result<Query<Transaction>> {
        self.client
            .query("transactions", "list", &params, Schema::QueryParams)
    }

    /// Build and submit a transaction in one call.
    ///
    /// `build` fills a fresh builder; if it fails, nothing is sent.
    pub async fn transact<F>(&self, build: F) -> Result<Transaction>
    where
        F: FnOnce(&mut TransactionBuilder) -> Result<()>,
    {
        let mut builder = self.client.builder();
        build(&mut builder)?;
        let body = body_of(&builder)?;
        tracing::debug!(actions = builder.actions().len(), "Submitting transaction");
        self.client.connection().request_as("transact", body).await
    }

    /// First phase: obtain an unsigned transaction template.
    pub async fn build(&self, builder: &TransactionBuilder) -> Result<Value> {
        let body = body_of(builder)?;
        self.client.request("build-transaction", body).await
    }

    /// Second phase: sign a template returned by [`Transactions::build`].
    pub async fn sign(&self, template: Value) -> Result<Value> {
        self.client
            .request("sign-transaction", json!({ "transaction": template }))
            .await
    }

    /// Final phase: commit a signed template.
    pub async fn submit(&self, signed: Value) -> Result<Transaction> {
        self.client
            .connection()
            .request_as("submit-transaction", json!({ "transaction": signed }))
            .await
    }
}

fn body_of(builder: &TransactionBuilder) -> Result<Value> {
    if builder.is_empty() {
        return Err(Error::invalid_parameters("transaction has no actions"));
    }
    builder.to_body()
}
