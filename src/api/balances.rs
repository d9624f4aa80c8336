//! Balances.

use crate::api::types::{Balance, BalanceParams};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Query;
use crate::schema::Schema;

pub struct Balances<'a> {
    client: &'a Client,
}

impl<'a> Balances<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Token amounts matching the filter, summed over `sum_by` fields.
    pub fn list(&self, params: BalanceParams) -> Result<Query<Balance>> {
        self.client
            .query("balances", "list", &params, Schema::SumParams)
    }
}
