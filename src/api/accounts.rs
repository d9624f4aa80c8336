//! Accounts.

use crate::api::types::{Account, CreateRequest, QueryParams, UpdateTagsRequest};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Accounts<'a> {
    client: &'a Client,
}

impl<'a> Accounts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create an account controlled by `key_ids`.
    pub async fn create(&self, params: CreateRequest) -> Result<Account> {
        self.client
            .post_as("create-account", &params, Schema::CreateAccount)
            .await
    }

    /// Replace the account's tags.
    pub async fn update_tags(&self, params: UpdateTagsRequest) -> Result<()> {
        self.client
            .post("update-account-tags", &params, Schema::UpdateTags)
            .await?;
        Ok(())
    }

    pub fn list(&self, params: QueryParams) -> Result<Query<Account>> {
        self.client
            .query("accounts", "list", &params, Schema::QueryParams)
    }
}
