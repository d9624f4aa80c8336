//! Root ledger client.
//!
//! # Responsibilities
//! - Validate configuration and wire up the request pipeline
//! - Hand out resource facades (`client.accounts()`, `client.transactions()`, ...)
//! - Run the local validators before any request leaves the process
//!
//! # Design Decisions
//! - `Client` is cheap to clone; clones share one connection and one session
//! - Facades borrow the client and hold no state of their own

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::api::builder::TransactionBuilder;
use crate::api::types::{check, to_body};
use crate::api::{
    Accounts, Actions, Balances, DevUtils, Feeds, Flavors, Indexes, Keys, StatsApi, Tokens,
    Transactions,
};
use crate::config::validation::validate_config;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pagination::Query;
use crate::schema::{BuiltinValidator, Schema, SchemaValidator};
use crate::transport::{Connection, SessionResolver};

/// Client for one ledger.
#[derive(Clone)]
pub struct Client {
    connection: Arc<Connection>,
    validator: Arc<dyn SchemaValidator>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client. No request is made until the first call.
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_config(&config).map_err(|errors| {
            let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Error::configuration(joined.join(", "))
        })?;

        tracing::debug!(
            ledger = %config.ledger_name,
            api_url = %config.api_url,
            "Creating ledger client"
        );

        Ok(Self {
            connection: Arc::new(Connection::new(&config)?),
            validator: Arc::new(BuiltinValidator),
        })
    }

    /// Replace the pre-flight body validator.
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(self)
    }

    pub fn actions(&self) -> Actions<'_> {
        Actions::new(self)
    }

    pub fn balances(&self) -> Balances<'_> {
        Balances::new(self)
    }

    pub fn dev_utils(&self) -> DevUtils<'_> {
        DevUtils::new(self)
    }

    pub fn feeds(&self) -> Feeds<'_> {
        Feeds::new(self)
    }

    pub fn flavors(&self) -> Flavors<'_> {
        Flavors::new(self)
    }

    pub fn indexes(&self) -> Indexes<'_> {
        Indexes::new(self)
    }

    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self)
    }

    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi::new(self)
    }

    pub fn tokens(&self) -> Tokens<'_> {
        Tokens::new(self)
    }

    pub fn transactions(&self) -> Transactions<'_> {
        Transactions::new(self)
    }

    /// Empty transaction builder sharing this client's validator.
    pub fn builder(&self) -> TransactionBuilder {
        TransactionBuilder::with_validator(Arc::clone(&self.validator))
    }

    /// POST an arbitrary body to `{ledger_url}/{path}`.
    pub async fn request(&self, path: &str, body: Value) -> Result<Value> {
        self.connection.request(path, body).await
    }

    pub fn session(&self) -> &SessionResolver {
        self.connection.session()
    }

    /// Check `params` and send them to `path`.
    pub(crate) async fn post<P>(&self, path: &str, params: &P, schema: Schema) -> Result<Value>
    where
        P: Serialize + Validate,
    {
        let body = self.prepare(params, schema)?;
        self.connection.request(path, body).await
    }

    /// Like [`Client::post`], decoding the response.
    pub(crate) async fn post_as<P, T>(&self, path: &str, params: &P, schema: Schema) -> Result<T>
    where
        P: Serialize + Validate,
        T: DeserializeOwned,
    {
        let body = self.prepare(params, schema)?;
        self.connection.request_as(path, body).await
    }

    /// Build a validated query.
    pub(crate) fn query<P, T>(
        &self,
        collection: &'static str,
        operation: &'static str,
        params: &P,
        schema: Schema,
    ) -> Result<Query<T>>
    where
        P: Serialize + Validate,
    {
        check(params)?;
        Query::new(
            Arc::clone(&self.connection),
            self.validator.as_ref(),
            collection,
            operation,
            to_body(params)?,
            schema,
        )
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    fn prepare<P>(&self, params: &P, schema: Schema) -> Result<Value>
    where
        P: Serialize + Validate,
    {
        check(params)?;
        let body = to_body(params)?;
        self.validator.validate(&body, schema)?;
        Ok(body)
    }
}
