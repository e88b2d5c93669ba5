//! Parsing for operator-typed numbers.
//!
//! Form fields arrive either as JSON numbers or as strings. Anything that is
//! not a number is rejected with a typed error instead of being read as zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// A numeric field exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumericInput {
    pub fn parse(&self, field: &str) -> CoreResult<Decimal> {
        match self {
            NumericInput::Number(n) => parse_decimal(field, &n.to_string()),
            NumericInput::Text(s) => parse_decimal(field, s),
        }
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Number(value.into())
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

pub fn parse_decimal(field: &str, raw: &str) -> CoreResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CoreError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Largest accepted money amount. Keeps fee and balance sums far from
/// `Decimal` overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

/// Largest accepted parcel weight in kilograms.
pub const MAX_WEIGHT_KG: Decimal = dec!(10000);

pub fn ensure_non_negative(field: &str, value: Decimal) -> CoreResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::Negative { field: field.to_string() });
    }
    Ok(value)
}

pub fn ensure_at_least(field: &str, value: Decimal, minimum: Decimal) -> CoreResult<Decimal> {
    if value < minimum {
        return Err(CoreError::BelowMinimum { field: field.to_string(), minimum });
    }
    Ok(value)
}

pub fn ensure_at_most(field: &str, value: Decimal, maximum: Decimal) -> CoreResult<Decimal> {
    if value > maximum {
        return Err(CoreError::TooLarge { field: field.to_string(), maximum });
    }
    Ok(value)
}

/// Non-negative and no larger than [`MAX_AMOUNT`].
pub fn ensure_amount(field: &str, value: Decimal) -> CoreResult<Decimal> {
    ensure_at_most(field, ensure_non_negative(field, value)?, MAX_AMOUNT)
}

/// At least one kilogram and no more than [`MAX_WEIGHT_KG`].
pub fn ensure_weight(value: Decimal) -> CoreResult<Decimal> {
    ensure_at_most("weight", ensure_at_least("weight", value, Decimal::ONE)?, MAX_WEIGHT_KG)
}

/// Money amounts: totals, paid, fees and margins.
pub fn parse_amount(field: &str, input: &NumericInput) -> CoreResult<Decimal> {
    ensure_amount(field, input.parse(field)?)
}

/// Same as [`parse_amount`] but a missing field takes `default`.
pub fn parse_amount_or(field: &str, input: Option<&NumericInput>, default: Decimal) -> CoreResult<Decimal> {
    match input {
        Some(input) => parse_amount(field, input),
        None => Ok(default),
    }
}

/// Shipment weight in kilograms; one kilogram is the billing floor.
pub fn parse_weight(input: &NumericInput) -> CoreResult<Decimal> {
    ensure_weight(input.parse("weight")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accepts_numbers_and_numeric_strings() {
        let from_number: NumericInput = serde_json::from_str("12.5").unwrap();
        let from_text: NumericInput = serde_json::from_str("\" 40 \"").unwrap();

        assert_eq!(parse_amount("paid", &from_number).unwrap(), dec!(12.5));
        assert_eq!(parse_amount("paid", &from_text).unwrap(), dec!(40));
    }

    #[test]
    fn test_rejects_garbage_instead_of_zero() {
        let err = parse_amount("total_amount", &"abc".into()).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidNumber { field: "total_amount".to_string(), value: "abc".to_string() }
        );

        let err = parse_amount("paid", &"".into()).unwrap_err();
        assert_eq!(err, CoreError::MissingField("paid".to_string()));
    }

    #[test]
    fn test_rejects_negative_amounts() {
        let err = parse_amount("shipping_profit", &NumericInput::from(-5)).unwrap_err();
        assert!(matches!(err, CoreError::Negative { .. }));
        assert_eq!(parse_amount("paid", &NumericInput::from(0)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_weight_floor() {
        assert_eq!(parse_weight(&"2.5".into()).unwrap(), dec!(2.5));
        assert!(matches!(
            parse_weight(&"0.5".into()),
            Err(CoreError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_rejects_values_past_the_bounds() {
        let huge = NumericInput::from("79228162514264337593543950335");
        assert!(matches!(
            parse_weight(&huge),
            Err(CoreError::TooLarge { field, .. }) if field == "weight"
        ));
        assert!(matches!(
            parse_amount("total_amount", &huge),
            Err(CoreError::TooLarge { field, .. }) if field == "total_amount"
        ));

        assert_eq!(parse_weight(&NumericInput::from(10_000)).unwrap(), MAX_WEIGHT_KG);
        assert_eq!(parse_amount("paid", &"1000000000".into()).unwrap(), MAX_AMOUNT);
    }

    #[test]
    fn test_missing_optional_takes_default() {
        assert_eq!(parse_amount_or("shipping_profit", None, dec!(20)).unwrap(), dec!(20));
    }
}
