//! Tokens.

use crate::api::types::{QueryParams, SumParams, TokenGroup, TokenSum};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Tokens<'a> {
    client: &'a Client,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self, params: QueryParams) -> Result<Query<TokenGroup>> {
        self.client.query("tokens", "list", &params, Schema::QueryParams)
    }

    pub fn sum(&self, params: SumParams) -> Result<Query<TokenSum>> {
        self.client.query("tokens", "sum", &params, Schema::SumParams)
    }
}
