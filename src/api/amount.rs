//! Token amounts.
//!
//! Amounts are non-negative integers up to `2^63 - 1`. Plain Rust integers
//! are held to the JSON safe-integer range (`2^53 - 1`); larger values must
//! be passed as decimal strings or [`rust_decimal::Decimal`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest amount accepted from a plain integer.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Largest amount the ledger stores.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// An amount as supplied by the caller, before range checks.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Number(i128),
    Text(String),
    Decimal(Decimal),
}

impl Default for AmountInput {
    fn default() -> Self {
        AmountInput::Number(0)
    }
}

macro_rules! amount_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for AmountInput {
            fn from(value: $t) -> Self {
                AmountInput::Number(value as i128)
            }
        })*
    };
}

amount_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, i128);

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(value: String) -> Self {
        AmountInput::Text(value)
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        AmountInput::Decimal(value)
    }
}

impl AmountInput {
    /// Check sign, integrality and range.
    pub fn resolve(&self) -> Result<Amount> {
        match self {
            AmountInput::Number(n) => {
                if *n < 0 {
                    return Err(negative(n));
                }
                if *n > MAX_SAFE_INTEGER as i128 {
                    return Err(Error::invalid_parameters(format!(
                        "amount {} exceeds {} for integer input; pass it as a string or decimal",
                        n, MAX_SAFE_INTEGER
                    )));
                }
                Ok(Amount(*n as u64))
            }
            AmountInput::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    // Digits only: parse exactly, however long.
                    return match trimmed.parse::<u128>() {
                        Ok(n) if n <= MAX_AMOUNT as u128 => Ok(Amount(n as u64)),
                        _ => Err(out_of_range(&trimmed)),
                    };
                }
                let decimal = Decimal::from_str(trimmed).map_err(|_| {
                    Error::invalid_parameters(format!("amount '{}' is not a number", text))
                })?;
                resolve_decimal(&decimal)
            }
            AmountInput::Decimal(decimal) => resolve_decimal(decimal),
        }
    }
}

fn resolve_decimal(decimal: &Decimal) -> Result<Amount> {
    if decimal.is_sign_negative() && !decimal.is_zero() {
        return Err(negative(decimal));
    }
    if !decimal.fract().is_zero() {
        return Err(Error::invalid_parameters(format!(
            "amount {} must be a whole number",
            decimal
        )));
    }
    match decimal.trunc().to_u64() {
        Some(n) if n <= MAX_AMOUNT => Ok(Amount(n)),
        _ => Err(out_of_range(decimal)),
    }
}

fn negative(value: &dyn fmt::Display) -> Error {
    Error::invalid_parameters(format!("amount {} must not be negative", value))
}

fn out_of_range(value: &dyn fmt::Display) -> Error {
    Error::invalid_parameters(format!("amount {} exceeds maximum {}", value, MAX_AMOUNT))
}

/// A validated amount. Serialized as a JSON integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > MAX_AMOUNT {
            return Err(out_of_range(&value));
        }
        Ok(Amount(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_integer_bounds() {
        assert_eq!(AmountInput::from(MAX_SAFE_INTEGER).resolve().unwrap().value(), MAX_SAFE_INTEGER);
        let err = AmountInput::from(1u64 << 53).resolve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(AmountInput::from(-1i64).resolve().is_err());
    }

    #[test]
    fn test_text_bounds() {
        assert_eq!(
            AmountInput::from("9223372036854775807").resolve().unwrap().value(),
            MAX_AMOUNT
        );
        assert!(AmountInput::from("9223372036854775808").resolve().is_err());
        assert!(AmountInput::from("99999999999999999999999999999999999999999").resolve().is_err());
        assert_eq!(AmountInput::from(" 42 ").resolve().unwrap().value(), 42);
        assert_eq!(AmountInput::from("100.0").resolve().unwrap().value(), 100);
        assert!(AmountInput::from("1.5").resolve().is_err());
        assert!(AmountInput::from("-3").resolve().is_err());
        assert!(AmountInput::from("abc").resolve().is_err());
        assert!(AmountInput::from("").resolve().is_err());
    }

    #[test]
    fn test_decimal_bounds() {
        let max = Decimal::from(i64::MAX);
        assert_eq!(AmountInput::from(max).resolve().unwrap().value(), MAX_AMOUNT);
        let over = max + Decimal::ONE;
        assert!(AmountInput::from(over).resolve().is_err());
        assert!(AmountInput::from(Decimal::new(15, 1)).resolve().is_err());
        assert_eq!(AmountInput::from(Decimal::ZERO).resolve().unwrap().value(), 0);
    }

    #[test]
    fn test_serializes_as_integer() {
        let amount = AmountInput::from("9223372036854775807").resolve().unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "9223372036854775807");
    }
}
