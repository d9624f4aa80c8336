//! Committed actions.

use crate::api::types::{Action, ActionSum, QueryParams, SumParams, UpdateTagsRequest};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Actions<'a> {
    client: &'a Client,
}

impl<'a> Actions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self, params: QueryParams) -> Result<Query<Action>> {
        self.client
            .query("actions", "list", &params, Schema::QueryParams)
    }

    /// Sum action amounts, grouped by `group_by` fields.
    pub fn sum(&self, params: SumParams) -> Result<Query<ActionSum>> {
        self.client.query("actions", "sum", &params, Schema::SumParams)
    }

    pub async fn update_tags(&self, params: UpdateTagsRequest) -> Result<()> {
        self.client
            .post("update-action-tags", &params, Schema::UpdateTags)
            .await?;
        Ok(())
    }
}
