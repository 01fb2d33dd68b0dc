//! Defensive decoding of the content API's JSON.
//!
//! Every helper accepts any JSON value and degrades to a default rather than
//! failing. Used through `#[serde(deserialize_with = ...)]` on the model types and
//! directly by the HTTP client when unwrapping response envelopes.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Empty strings count as absent.
pub(crate) fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).filter(|s| !s.trim().is_empty()))
}

/// Accepts an array of scalars or a comma-separated string.
pub(crate) fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    Ok(list)
}

pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(positive_count(&Value::deserialize(deserializer)?).unwrap_or(0))
}

pub(crate) fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    };
    Ok(parsed)
}

/// Decodes a nested object, falling back to `T::default()` for anything else.
pub(crate) fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

pub(crate) fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(items(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Decodes an array element by element, dropping elements that are not objects
/// or fail to decode. Returns `None` when `value` is not an array at all.
pub(crate) fn items<T: DeserializeOwned>(value: Value) -> Option<Vec<T>> {
    let Value::Array(values) = value else {
        return None;
    };

    let total = values.len();
    let decoded: Vec<T> = values
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if decoded.len() < total {
        tracing::debug!(
            total,
            kept = decoded.len(),
            "Dropped malformed entries from item list"
        );
    }
    Some(decoded)
}

/// Interprets a JSON number or numeric string as a count of at least 1.
///
/// Fractions are truncated. Zero, negatives, NaN-like strings and every other
/// JSON type yield `None`.
pub(crate) fn positive_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() || n < 1.0 {
        return None;
    }
    Some(n.min(u32::MAX as f64) as u32)
}

/// Reads the `success` flag of an API envelope. Missing counts as failure.
pub(crate) fn envelope_ok(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}
