//! Transaction builder.
//!
//! # Responsibilities
//! - Accumulate issue/transfer/retire actions in order
//! - Validate every action before it is accepted
//! - Render the action list and transaction tags as one request body
//!
//! # Design Decisions
//! - All checks run synchronously; a rejected action never reaches the wire
//! - The builder does not know whether it is submitted through `transact` or
//!   the build/sign/submit sequence

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::amount::{Amount, AmountInput};
use crate::api::types::{check, to_body, Tags};
use crate::error::Result;
use crate::schema::{BuiltinValidator, Schema, SchemaValidator};

#[derive(Debug, Clone, Default, Validate)]
pub struct IssueParams {
    #[validate(length(min = 1, message = "flavorId must not be empty"))]
    pub flavor_id: String,
    pub amount: AmountInput,
    #[validate(length(min = 1, message = "destinationAccountId must not be empty"))]
    pub destination_account_id: String,
    pub token_tags: Option<Tags>,
    pub action_tags: Option<Tags>,
}

impl IssueParams {
    pub fn new(
        flavor_id: impl Into<String>,
        amount: impl Into<AmountInput>,
        destination_account_id: impl Into<String>,
    ) -> Self {
        Self {
            flavor_id: flavor_id.into(),
            amount: amount.into(),
            destination_account_id: destination_account_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct TransferParams {
    #[validate(length(min = 1, message = "flavorId must not be empty"))]
    pub flavor_id: String,
    pub amount: AmountInput,
    #[validate(length(min = 1, message = "sourceAccountId must not be empty"))]
    pub source_account_id: String,
    #[validate(length(min = 1, message = "destinationAccountId must not be empty"))]
    pub destination_account_id: String,
    /// Token filter restricting which tokens are spent.
    pub filter: Option<String>,
    pub filter_params: Vec<Value>,
    pub token_tags: Option<Tags>,
    pub action_tags: Option<Tags>,
}

impl TransferParams {
    pub fn new(
        flavor_id: impl Into<String>,
        amount: impl Into<AmountInput>,
        source_account_id: impl Into<String>,
        destination_account_id: impl Into<String>,
    ) -> Self {
        Self {
            flavor_id: flavor_id.into(),
            amount: amount.into(),
            source_account_id: source_account_id.into(),
            destination_account_id: destination_account_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RetireParams {
    #[validate(length(min = 1, message = "flavorId must not be empty"))]
    pub flavor_id: String,
    pub amount: AmountInput,
    #[validate(length(min = 1, message = "sourceAccountId must not be empty"))]
    pub source_account_id: String,
    pub filter: Option<String>,
    pub filter_params: Vec<Value>,
    pub action_tags: Option<Tags>,
}

impl RetireParams {
    pub fn new(
        flavor_id: impl Into<String>,
        amount: impl Into<AmountInput>,
        source_account_id: impl Into<String>,
    ) -> Self {
        Self {
            flavor_id: flavor_id.into(),
            amount: amount.into(),
            source_account_id: source_account_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Issue,
    Transfer,
    Retire,
}

/// An accepted, not yet submitted action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub flavor_id: String,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_params: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_tags: Option<Tags>,
}

/// Ordered accumulator of actions for one transaction.
#[derive(Clone)]
pub struct TransactionBuilder {
    actions: Vec<PendingAction>,
    transaction_tags: Option<Tags>,
    validator: Arc<dyn SchemaValidator>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("actions", &self.actions)
            .field("transaction_tags", &self.transaction_tags)
            .finish()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::with_validator(Arc::new(BuiltinValidator))
    }

    pub fn with_validator(validator: Arc<dyn SchemaValidator>) -> Self {
        Self {
            actions: Vec::new(),
            transaction_tags: None,
            validator,
        }
    }

    /// Add an action creating `amount` new tokens in the destination account.
    pub fn issue(&mut self, params: IssueParams) -> Result<&mut Self> {
        check(&params)?;
        let action = PendingAction {
            kind: ActionType::Issue,
            flavor_id: params.flavor_id,
            amount: params.amount.resolve()?,
            source_account_id: None,
            destination_account_id: Some(params.destination_account_id),
            filter: None,
            filter_params: Vec::new(),
            token_tags: params.token_tags,
            action_tags: params.action_tags,
        };
        self.push(action, Schema::IssueAction)
    }

    /// Add an action moving tokens between accounts.
    pub fn transfer(&mut self, params: TransferParams) -> Result<&mut Self> {
        check(&params)?;
        let action = PendingAction {
            kind: ActionType::Transfer,
            flavor_id: params.flavor_id,
            amount: params.amount.resolve()?,
            source_account_id: Some(params.source_account_id),
            destination_account_id: Some(params.destination_account_id),
            filter: params.filter,
            filter_params: params.filter_params,
            token_tags: params.token_tags,
            action_tags: params.action_tags,
        };
        self.push(action, Schema::TransferAction)
    }

    /// Add an action destroying tokens held by the source account.
    pub fn retire(&mut self, params: RetireParams) -> Result<&mut Self> {
        check(&params)?;
        let action = PendingAction {
            kind: ActionType::Retire,
            flavor_id: params.flavor_id,
            amount: params.amount.resolve()?,
            source_account_id: Some(params.source_account_id),
            destination_account_id: None,
            filter: params.filter,
            filter_params: params.filter_params,
            token_tags: None,
            action_tags: params.action_tags,
        };
        self.push(action, Schema::RetireAction)
    }

    /// Tags recorded on the transaction itself.
    pub fn transaction_tags(&mut self, tags: Tags) -> &mut Self {
        self.transaction_tags = Some(tags);
        self
    }

    pub fn actions(&self) -> &[PendingAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Request body: `{actions, transactionTags?}`.
    pub fn to_body(&self) -> Result<Value> {
        let mut body = json!({ "actions": to_body(&self.actions)? });
        if let Some(tags) = &self.transaction_tags {
            body["transactionTags"] = Value::Object(tags.clone());
        }
        Ok(body)
    }

    fn push(&mut self, action: PendingAction, schema: Schema) -> Result<&mut Self> {
        self.validator.validate(&to_body(&action)?, schema)?;
        self.actions.push(action);
        Ok(self)
    }
}
