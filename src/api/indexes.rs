//! Indexes.

use crate::api::types::{CreateIndexRequest, IdRequest, Index, NoParams};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Indexes<'a> {
    client: &'a Client,
}

impl<'a> Indexes<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, params: CreateIndexRequest) -> Result<Index> {
        self.client
            .post_as("create-index", &params, Schema::CreateIndex)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .post("delete-index", &IdRequest::new(id), Schema::ById)
            .await?;
        Ok(())
    }

    pub fn list(&self) -> Result<Query<Index>> {
        self.client
            .query("indexes", "list", &NoParams {}, Schema::QueryParams)
    }
}
