//! Flavors: fungible token types.

use crate::api::types::{CreateRequest, Flavor, QueryParams, UpdateTagsRequest};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Flavors<'a> {
    client: &'a Client,
}

impl<'a> Flavors<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, params: CreateRequest) -> Result<Flavor> {
        self.client
            .post_as("create-flavor", &params, Schema::CreateFlavor)
            .await
    }

    pub async fn update_tags(&self, params: UpdateTagsRequest) -> Result<()> {
        self.client
            .post("update-flavor-tags", &params, Schema::UpdateTags)
            .await?;
        Ok(())
    }

    pub fn list(&self, params: QueryParams) -> Result<Query<Flavor>> {
        self.client
            .query("flavors", "list", &params, Schema::QueryParams)
    }
}
