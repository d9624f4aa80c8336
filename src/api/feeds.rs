//! Feeds: server-side cursors over new actions or transactions.

use crate::api::types::{CreateFeedRequest, Feed, IdRequest, NoParams};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Feeds<'a> {
    client: &'a Client,
}

impl<'a> Feeds<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, params: CreateFeedRequest) -> Result<Feed> {
        self.client
            .post_as("create-feed", &params, Schema::CreateFeed)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Feed> {
        self.client
            .post_as("get-feed", &IdRequest::new(id), Schema::ById)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .post("delete-feed", &IdRequest::new(id), Schema::ById)
            .await?;
        Ok(())
    }

    pub fn list(&self) -> Result<Query<Feed>> {
        self.client
            .query("feeds", "list", &NoParams {}, Schema::QueryParams)
    }
}
