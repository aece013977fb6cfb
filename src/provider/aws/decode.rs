//! # Secret Value Decoding
//!
//! Turns a Secrets Manager value into a [`SecretPayload`].
//!
//! - `SecretString` must be a JSON object whose values are all strings;
//!   each entry becomes one payload key. Keys must be valid Secret data keys.
//! - `SecretBinary` becomes a single entry under [`BINARY_SECRET_KEY`].
//!
//! Text that is not such an object is rejected rather than wrapped, so a
//! typo in the store never silently replaces a structured secret with one blob.
//!
//! [`BINARY_SECRET_KEY`]: crate::sync::BINARY_SECRET_KEY

use crate::config::validation::validate_secret_key;
use crate::sync::{SecretPayload, SyncError};
use serde_json::Value;

/// Decode the `SecretString` form of a secret
pub fn decode_secret_string(name: &str, text: &str) -> Result<SecretPayload, SyncError> {
    // Error messages must never include the secret text itself.
    let value: Value = serde_json::from_str(text).map_err(|e| {
        SyncError::malformed(
            name,
            format!(
                "secret string is not valid JSON (line {}, column {})",
                e.line(),
                e.column()
            ),
        )
    })?;

    let Value::Object(entries) = value else {
        return Err(SyncError::malformed(
            name,
            format!(
                "expected a JSON object of string values, got {}",
                json_type(&value)
            ),
        ));
    };

    entries
        .into_iter()
        .map(|(key, value)| {
            validate_secret_key(&key).map_err(|reason| SyncError::malformed(name, reason))?;
            match value {
                Value::String(text) => Ok((key, text.into_bytes())),
                other => Err(SyncError::malformed(
                    name,
                    format!("value for key '{key}' is {}, expected a string", json_type(&other)),
                )),
            }
        })
        .collect()
}

/// Decode the `SecretBinary` form of a secret
#[must_use]
pub fn decode_secret_binary(blob: &[u8]) -> SecretPayload {
    SecretPayload::from_blob(blob)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
