//! Development helpers.

use serde_json::json;

use crate::client::Client;
use crate::error::Result;

pub struct DevUtils<'a> {
    client: &'a Client,
}

impl<'a> DevUtils<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Delete all data in the ledger. Only permitted on development ledgers.
    pub async fn reset(&self) -> Result<()> {
        tracing::warn!("Resetting ledger");
        self.client.request("reset", json!({})).await?;
        Ok(())
    }
}
