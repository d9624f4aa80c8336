//! Request parameters and response records.
//!
//! Request types serialize to camelCase and are validated twice: field rules
//! through `validator`, then the body shape through the client's
//! [`SchemaValidator`](crate::schema::SchemaValidator). Response records
//! deserialize from camelized bodies; user tag maps stay as raw JSON maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{Error, Result};

/// Free-form user tags. Never re-cased.
pub type Tags = Map<String, Value>;

/// Run `validator` field rules, mapping failures to `InvalidParameters`.
pub(crate) fn check<T: Validate>(params: &T) -> Result<()> {
    params
        .validate()
        .map_err(|e| Error::invalid_parameters(e.to_string().replace('\n', "; ")))
}

/// Serialize request params into a JSON body.
pub(crate) fn to_body<T: Serialize>(params: &T) -> Result<Value> {
    serde_json::to_value(params)
        .map_err(|e| Error::invalid_parameters(format!("params are not serializable: {}", e)))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Filter for list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "filter must not be empty"))]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_params: Vec<Value>,
}

impl QueryParams {
    pub fn filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            filter_params: Vec::new(),
        }
    }

    pub fn param(mut self, value: impl Into<Value>) -> Self {
        self.filter_params.push(value.into());
        self
    }
}

/// Filter plus grouping for sum queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SumParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "filter must not be empty"))]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_params: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
}

/// Filter plus summation fields for balance queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BalanceParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "filter must not be empty"))]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_params: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sum_by: Vec<String>,
}

/// Restrict a key listing to specific ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KeyListParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

/// Create an account or a flavor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "keyIds must name at least one key"))]
    pub key_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "quorum must be at least 1"))]
    pub quorum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

impl CreateRequest {
    pub fn new(id: impl Into<String>, key_ids: Vec<String>) -> Self {
        Self {
            id: Some(id.into()),
            key_ids,
            ..Self::default()
        }
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Replace the tags of an account, flavor or action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagsRequest {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: Option<String>,
}

/// Body of the by-id operations (`get-feed`, `delete-index`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct IdRequest {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
}

impl IdRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Empty body for queries that take no parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoParams {}

impl Validate for NoParams {
    fn validate(&self) -> std::result::Result<(), validator::ValidationErrors> {
        Ok(())
    }
}

/// What a feed follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    Action,
    Transaction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: FeedType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_params: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Collection indexed, e.g. `action` or `token`.
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type must not be empty"))]
    pub kind: String,
    /// `list` or `sum`.
    #[validate(length(min = 1, message = "method must not be empty"))]
    pub method: String,
    #[validate(length(min = 1, message = "filter must not be empty"))]
    pub filter: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

// Grouped results are decoded through a map rather than `#[serde(flatten)]`,
// which cannot read arbitrary-precision numbers.
fn split_amount(mut map: Map<String, Value>) -> std::result::Result<(u64, Map<String, Value>), String> {
    let amount = match map.remove("amount") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .ok_or_else(|| format!("amount {} is not an unsigned integer", value))?,
    };
    Ok((amount, map))
}

fn join_amount(amount: u64, mut group: Map<String, Value>) -> Map<String, Value> {
    group.insert("amount".to_string(), Value::from(amount));
    group
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: String,
    pub key_ids: Vec<String>,
    pub quorum: u32,
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Key {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flavor {
    pub id: String,
    pub key_ids: Vec<String>,
    pub quorum: u32,
    pub tags: Tags,
}

/// A committed action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Action {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    pub transaction_id: String,
    pub flavor_id: String,
    pub amount: u64,
    pub source_account_id: Option<String>,
    pub destination_account_id: Option<String>,
    pub tags: Tags,
    /// Tags of the referenced objects at the time of the action.
    pub snapshot: Option<Value>,
}

/// One group of an action sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ActionSum {
    pub amount: u64,
    /// The `group_by` fields of this group.
    pub group: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for ActionSum {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let (amount, group) = split_amount(map)?;
        Ok(Self { amount, group })
    }
}

impl From<ActionSum> for Map<String, Value> {
    fn from(value: ActionSum) -> Self {
        join_amount(value.amount, value.group)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub timestamp: String,
    pub sequence_number: u64,
    pub actions: Vec<Action>,
    pub tags: Tags,
}

/// One group of a balance query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balance {
    pub amount: u64,
    /// Values of the requested `sum_by` fields for this group.
    pub sum_by: Map<String, Value>,
}

impl Balance {
    /// String value of a grouping field, keyed in local case (`accountId`).
    pub fn group_str(&self, key: &str) -> Option<&str> {
        self.sum_by.get(key).and_then(Value::as_str)
    }
}

/// A group of identical tokens held by one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenGroup {
    pub amount: u64,
    pub flavor_id: String,
    pub flavor_tags: Tags,
    pub account_id: String,
    pub account_tags: Tags,
    pub tags: Tags,
}

/// One group of a token sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TokenSum {
    pub amount: u64,
    /// The `group_by` fields of this group.
    pub group: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for TokenSum {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let (amount, group) = split_amount(map)?;
        Ok(Self { amount, group })
    }
}

impl From<TokenSum> for Map<String, Value> {
    fn from(value: TokenSum) -> Self {
        join_amount(value.amount, value.group)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feed {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FeedType,
    pub filter: String,
    pub filter_params: Vec<Value>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Index {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub method: String,
    pub filter: String,
    pub group_by: Vec<String>,
}

/// Ledger-wide usage counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub flavor_count: u64,
    pub account_count: u64,
    pub tx_count: u64,
}
