//! Lenient coercion helpers shared by the wire models.
//!
//! The backend is loose about types: weights arrive as numbers or strings, ids
//! as integers or strings. These helpers absorb that at deserialization time so
//! consumers never see a decode failure for a badly typed optional field.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value into a finite number.
///
/// Numbers and numeric strings (surrounding whitespace allowed) yield
/// `Some`; everything else, including `NaN`/infinite results, empty strings,
/// `null`, booleans, arrays and objects, yields `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_str(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// String flavour of [`to_number`].
pub fn parse_number_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Accept a string or a number and render it as a string.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = Value::deserialize(deserializer)?;
    value_to_string(&value)
        .ok_or_else(|| D::Error::custom(format!("expected string or number id, got {value}")))
}

pub(crate) fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_number))
}

/// Truncate a response body for error messages.
pub(crate) fn body_snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
