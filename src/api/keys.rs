//! Signing keys.

use crate::api::types::{CreateKeyRequest, Key, KeyListParams};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Keys<'a> {
    client: &'a Client,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a key; the backend assigns an id when none is given.
    pub async fn create(&self, params: CreateKeyRequest) -> Result<Key> {
        self.client
            .post_as("create-key", &params, Schema::CreateKey)
            .await
    }

    pub fn list(&self, params: KeyListParams) -> Result<Query<Key>> {
        self.client.query("keys", "list", &params, Schema::QueryParams)
    }
}
