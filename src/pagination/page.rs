//! One page of query results.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::pagination::query::{PageParams, Query};
use crate::transport::http::LedgerResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    last_page: bool,
}

/// A snapshot of one page. Fetching the next page never changes this one.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in server order. May be empty on a non-final page of a sum.
    pub items: Vec<T>,
    /// Continuation token; `None` when the server sent none.
    pub cursor: Option<String>,
    pub last_page: bool,
    query: Query<T>,
}

impl<T: DeserializeOwned> Page<T> {
    pub(crate) fn from_response(mut response: LedgerResponse, query: Query<T>) -> Result<Self> {
        let body = response.body.take();
        let raw: RawPage = response.decode_part(body)?;
        let items = raw
            .items
            .into_iter()
            .map(|item| response.decode_part(item))
            .collect::<Result<Vec<T>>>()?;
        Ok(Self {
            items,
            cursor: raw.cursor.filter(|c| !c.is_empty()),
            last_page: raw.last_page,
            query,
        })
    }

    /// Fetch the page after this one.
    ///
    /// After the last page, or when no cursor was returned, this yields an
    /// empty final page without contacting the server.
    pub async fn next_page(&self) -> Result<Page<T>> {
        match (&self.cursor, self.last_page) {
            (Some(cursor), false) => {
                self.query
                    .page(PageParams::default().cursor(cursor.clone()))
                    .await
            }
            _ => Ok(Page {
                items: Vec::new(),
                cursor: None,
                last_page: true,
                query: self.query.clone(),
            }),
        }
    }

    /// The query this page belongs to.
    pub fn query(&self) -> &Query<T> {
        &self.query
    }
}
