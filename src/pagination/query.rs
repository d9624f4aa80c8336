//! Immutable list/sum queries.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::pagination::items::Items;
use crate::pagination::page::Page;
use crate::schema::{Schema, SchemaValidator};
use crate::transport::Connection;

/// Per-request paging options.
///
/// A cursor continues a previous page and takes precedence over `size`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub size: Option<u32>,
    pub cursor: Option<String>,
}

impl PageParams {
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// A query over one collection, e.g. `list-accounts` or `sum-tokens`.
///
/// Parameters are fixed at construction; every [`Query::page`] call issues a
/// fresh request built from them.
pub struct Query<T> {
    connection: Arc<Connection>,
    collection: &'static str,
    operation: &'static str,
    params: Map<String, Value>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            collection: self.collection,
            operation: self.operation,
            params: self.params.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("path", &self.path())
            .field("params", &self.params)
            .finish()
    }
}

impl<T> Query<T> {
    /// Build a query, validating `params` before anything is sent.
    pub(crate) fn new(
        connection: Arc<Connection>,
        validator: &dyn SchemaValidator,
        collection: &'static str,
        operation: &'static str,
        params: Value,
        schema: Schema,
    ) -> Result<Self> {
        validator.validate(&params, schema)?;
        let params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::invalid_parameters(format!(
                    "query params must be an object, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            connection,
            collection,
            operation,
            params,
            _item: PhantomData,
        })
    }

    /// Endpoint path, `{operation}-{collection}`.
    pub fn path(&self) -> String {
        format!("{}-{}", self.operation, self.collection)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Request body for one page.
    ///
    /// With a cursor the body is the cursor alone; the backend already knows
    /// the filter it was issued for.
    pub fn page_body(&self, page: &PageParams) -> Value {
        let mut body = Map::new();
        match page.cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(cursor) => {
                body.insert("cursor".to_string(), Value::from(cursor));
            }
            None => {
                body = self.params.clone();
                if let Some(size) = page.size {
                    body.insert("pageSize".to_string(), Value::from(size));
                }
            }
        }
        Value::Object(body)
    }
}

impl<T: DeserializeOwned> Query<T> {
    /// Fetch one page.
    pub async fn page(&self, params: PageParams) -> Result<Page<T>> {
        let path = self.path();
        let response = self.connection.send(&path, self.page_body(&params)).await?;
        let page = Page::from_response(response, self.clone())?;
        tracing::debug!(
            path = %path,
            items = page.items.len(),
            last_page = page.last_page,
            continued = params.cursor.is_some(),
            "Fetched page"
        );
        Ok(page)
    }

    /// Lazy iterator over every item, in server order.
    pub fn all(&self) -> Items<T> {
        Items::new(self.clone())
    }

    /// Drain [`Query::all`] into a vector.
    pub async fn collect_all(&self) -> Result<Vec<T>> {
        let mut items = self.all();
        let mut out = Vec::new();
        while let Some(item) = items.next().await? {
            out.push(item);
        }
        Ok(out)
    }
}
