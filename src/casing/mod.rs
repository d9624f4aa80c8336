//! Key casing conversion for request and response bodies.
//!
//! # Data Flow
//! ```text
//! outgoing body (camelCase keys)
//!     → snakeize → wire (snake_case keys)
//!
//! incoming body (snake_case keys)
//!     → camelize → local (camelCase keys)
//! ```
//!
//! # Design Decisions
//! - Children of excluded keys (user tag/data maps, cursors) pass through
//!   untouched; exclusion is matched on the snake_case form of the key
//! - Keys with no lower-case letters are constants and never rewritten
//! - Conversion is in place on `serde_json::Value`

use serde_json::{Map, Value};

/// Keys whose children are user data and must not be re-cased.
pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &[
    "after",
    "next",
    "tags",
    "reference_data",
    "account_tags",
    "asset_tags",
    "flavor_tags",
    "action_tags",
    "token_tags",
    "transaction_tags",
    "source_account_tags",
    "destination_account_tags",
    "filter_params",
];

/// Bidirectional snake_case / camelCase key converter.
#[derive(Debug, Clone)]
pub struct CaseConverter {
    excluded: Vec<String>,
}

impl Default for CaseConverter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_KEYS.iter().copied())
    }
}

impl CaseConverter {
    /// Create a converter with a custom exclusion list (snake_case keys).
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    fn is_excluded(&self, snake_key: &str) -> bool {
        self.excluded.iter().any(|k| k == snake_key)
    }

    /// Rewrite every key to snake_case, in place.
    pub fn snakeize(&self, value: &mut Value) {
        self.convert(value, Direction::Snake);
    }

    /// Rewrite every key to camelCase, in place.
    pub fn camelize(&self, value: &mut Value) {
        self.convert(value, Direction::Camel);
    }

    /// Consuming variant of [`CaseConverter::snakeize`].
    pub fn to_snake(&self, mut value: Value) -> Value {
        self.snakeize(&mut value);
        value
    }

    /// Consuming variant of [`CaseConverter::camelize`].
    pub fn to_camel(&self, mut value: Value) -> Value {
        self.camelize(&mut value);
        value
    }

    fn convert(&self, value: &mut Value, direction: Direction) {
        match value {
            Value::Object(map) => {
                let old = std::mem::take(map);
                let mut converted = Map::with_capacity(old.len());
                for (key, mut child) in old {
                    let new_key = match direction {
                        Direction::Snake => snake_key(&key),
                        Direction::Camel => camel_key(&key),
                    };
                    let snake_form = match direction {
                        Direction::Snake => new_key.as_str(),
                        Direction::Camel => key.as_str(),
                    };
                    if !self.is_excluded(snake_form) {
                        self.convert(&mut child, direction);
                    }
                    converted.insert(new_key, child);
                }
                *map = converted;
            }
            Value::Array(items) => {
                for item in items {
                    self.convert(item, direction);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Snake,
    Camel,
}

fn is_constant(key: &str) -> bool {
    key.chars().any(|c| c.is_ascii_uppercase()) && !key.chars().any(|c| c.is_ascii_lowercase())
}

/// `flavorId` → `flavor_id`.
pub fn snake_key(key: &str) -> String {
    if is_constant(key) || !key.chars().any(|c| c.is_ascii_uppercase()) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `flavor_id` → `flavorId`.
pub fn camel_key(key: &str) -> String {
    if is_constant(key) || !key.contains('_') {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
