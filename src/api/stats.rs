//! Ledger usage statistics.

use serde_json::json;

use crate::api::types::Stats;
use crate::client::Client;
use crate::error::Result;

pub struct StatsApi<'a> {
    client: &'a Client,
}

impl<'a> StatsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Stats> {
        self.client.connection().request_as("stats", json!({})).await
    }
}
