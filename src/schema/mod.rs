//! Local request-body validation.
//!
//! # Data Flow
//! ```text
//! facade / builder params (camelCase Value)
//!     → SchemaValidator::validate(body, Schema)
//!         → Ok: request proceeds
//!         → Err(InvalidParameters): nothing is sent
//! ```
//!
//! # Design Decisions
//! - Validation runs on the JSON body, so caller-supplied raw bodies and
//!   typed params go through the same rules
//! - The validator is a trait object on the client; [`BuiltinValidator`] is
//!   the default and can be replaced or wrapped
//! - Only the first problem is reported

use serde_json::{Map, Value};

use crate::error::{Error, Result};

use self::FieldType::{Amount, Array, Integer, Object, StringArray, Text};

/// Named body shapes checked before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    IssueAction,
    TransferAction,
    RetireAction,
    QueryParams,
    SumParams,
    CreateAccount,
    CreateFlavor,
    CreateKey,
    UpdateTags,
    CreateFeed,
    CreateIndex,
    ById,
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::IssueAction => "IssueActionSchema",
            Schema::TransferAction => "TransferActionSchema",
            Schema::RetireAction => "RetireActionSchema",
            Schema::QueryParams => "QueryParamsSchema",
            Schema::SumParams => "SumParamsSchema",
            Schema::CreateAccount => "CreateAccountSchema",
            Schema::CreateFlavor => "CreateFlavorSchema",
            Schema::CreateKey => "CreateKeySchema",
            Schema::UpdateTags => "UpdateTagsSchema",
            Schema::CreateFeed => "CreateFeedSchema",
            Schema::CreateIndex => "CreateIndexSchema",
            Schema::ById => "IdSchema",
        }
    }

    fn fields(&self) -> &'static [Field] {
        match self {
            Schema::IssueAction => ISSUE_ACTION,
            Schema::TransferAction => TRANSFER_ACTION,
            Schema::RetireAction => RETIRE_ACTION,
            Schema::QueryParams => QUERY_PARAMS,
            Schema::SumParams => SUM_PARAMS,
            Schema::CreateAccount => CREATE_ACCOUNT,
            Schema::CreateFlavor => CREATE_FLAVOR,
            Schema::CreateKey => CREATE_KEY,
            Schema::UpdateTags => UPDATE_TAGS,
            Schema::CreateFeed => CREATE_FEED,
            Schema::CreateIndex => CREATE_INDEX,
            Schema::ById => BY_ID,
        }
    }
}

/// Pluggable pre-flight validator.
pub trait SchemaValidator: Send + Sync {
    /// Fail with [`Error::InvalidParameters`] if `body` does not match `schema`.
    fn validate(&self, body: &Value, schema: Schema) -> Result<()>;
}

/// Validator that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl SchemaValidator for NoopValidator {
    fn validate(&self, _body: &Value, _schema: Schema) -> Result<()> {
        Ok(())
    }
}

/// Checks allowed properties, required properties and value types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValidator;

impl SchemaValidator for BuiltinValidator {
    fn validate(&self, body: &Value, schema: Schema) -> Result<()> {
        let object = match body {
            Value::Object(map) => map,
            Value::Null => return check_object(&Map::new(), schema),
            _ => {
                return Err(Error::invalid_parameters(format!(
                    "{}: body should be object",
                    schema.name()
                )))
            }
        };
        check_object(object, schema)
    }
}

fn check_object(object: &Map<String, Value>, schema: Schema) -> Result<()> {
    let fields = schema.fields();

    let unexpected: Vec<&str> = object
        .keys()
        .filter(|key| !fields.iter().any(|f| f.name == key.as_str()))
        .map(String::as_str)
        .collect();
    if !unexpected.is_empty() {
        return Err(Error::invalid_parameters(format!(
            "{}: object had unexpected properties: {}",
            schema.name(),
            unexpected.join(", ")
        )));
    }

    for field in fields {
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(Error::invalid_parameters(format!(
                    "{}: missing required property '{}'",
                    schema.name(),
                    field.name
                )));
            }
            None | Some(Value::Null) => {}
            Some(value) if !field.kind.accepts(value) => {
                return Err(Error::invalid_parameters(format!(
                    "{}: property '{}' should be {}",
                    schema.name(),
                    field.name,
                    field.kind.describe()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum FieldType {
    Text,
    Integer,
    Amount,
    Object,
    Array,
    StringArray,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Text => value.is_string(),
            FieldType::Integer => value.is_u64() || value.is_i64(),
            // Range is checked when the amount is resolved.
            FieldType::Amount => value.is_number() || value.is_string(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
            FieldType::StringArray => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Integer => "integer",
            FieldType::Amount => "number or numeric string",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::StringArray => "array of strings",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    kind: FieldType,
    required: bool,
}

impl Field {
    const fn required(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

const ISSUE_ACTION: &[Field] = &[
    Field::optional("type", Text),
    Field::required("flavorId", Text),
    Field::required("amount", Amount),
    Field::required("destinationAccountId", Text),
    Field::optional("tokenTags", Object),
    Field::optional("actionTags", Object),
];

const TRANSFER_ACTION: &[Field] = &[
    Field::optional("type", Text),
    Field::required("flavorId", Text),
    Field::required("amount", Amount),
    Field::required("sourceAccountId", Text),
    Field::required("destinationAccountId", Text),
    Field::optional("filter", Text),
    Field::optional("filterParams", Array),
    Field::optional("tokenTags", Object),
    Field::optional("actionTags", Object),
];

const RETIRE_ACTION: &[Field] = &[
    Field::optional("type", Text),
    Field::required("flavorId", Text),
    Field::required("amount", Amount),
    Field::required("sourceAccountId", Text),
    Field::optional("filter", Text),
    Field::optional("filterParams", Array),
    Field::optional("actionTags", Object),
];

const QUERY_PARAMS: &[Field] = &[
    Field::optional("filter", Text),
    Field::optional("filterParams", Array),
    Field::optional("ids", StringArray),
];

const SUM_PARAMS: &[Field] = &[
    Field::optional("filter", Text),
    Field::optional("filterParams", Array),
    Field::optional("groupBy", StringArray),
    Field::optional("sumBy", StringArray),
];

const CREATE_ACCOUNT: &[Field] = &[
    Field::optional("id", Text),
    Field::required("keyIds", StringArray),
    Field::optional("quorum", Integer),
    Field::optional("tags", Object),
];

const CREATE_FLAVOR: &[Field] = &[
    Field::optional("id", Text),
    Field::required("keyIds", StringArray),
    Field::optional("quorum", Integer),
    Field::optional("tags", Object),
];

const CREATE_KEY: &[Field] = &[Field::optional("id", Text)];

const UPDATE_TAGS: &[Field] = &[
    Field::required("id", Text),
    Field::optional("tags", Object),
];

const CREATE_FEED: &[Field] = &[
    Field::optional("id", Text),
    Field::required("type", Text),
    Field::optional("filter", Text),
    Field::optional("filterParams", Array),
];

const CREATE_INDEX: &[Field] = &[
    Field::optional("id", Text),
    Field::required("type", Text),
    Field::required("method", Text),
    Field::required("filter", Text),
    Field::optional("groupBy", StringArray),
];

const BY_ID: &[Field] = &[Field::required("id", Text)];
