//! Scalar notation used by behavioural test suites.
//!
//! Scenario steps write field states as `unset`, `null` or a quoted value;
//! these helpers turn that notation into presence-aware values.

use patchwise::OptionalValue;
use serde_json::Value;

/// Strips one layer of matching single or double quotes from a value.
#[must_use]
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return stripped;
    }
    if let Some(stripped) = trimmed
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
    {
        return stripped;
    }
    trimmed
}

/// Parses `unset`, `null` or a (quoted) text value.
#[must_use]
pub fn optional_text(value: &str) -> OptionalValue<String> {
    match value.trim() {
        "unset" => OptionalValue::Unset,
        "null" => OptionalValue::Null,
        other => OptionalValue::Present(unquote(other).to_owned()),
    }
}

/// Parses a scenario scalar into a JSON value.
///
/// `null` becomes JSON null, bare integers become numbers and anything else
/// becomes a string with one layer of quotes removed. Returns `None` for
/// `unset`.
#[must_use]
pub fn json_scalar(value: &str) -> Option<Value> {
    match value.trim() {
        "unset" => None,
        "null" => Some(Value::Null),
        other => Some(
            other
                .parse::<u64>()
                .map_or_else(|_| Value::String(unquote(other).to_owned()), Value::from),
        ),
    }
}
