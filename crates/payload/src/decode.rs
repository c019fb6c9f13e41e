//! Strict schema decode
//!
//! Decodes an intermediate record into its typed domain value. Branded
//! types (`EmailAddress`, `WorkspaceId`, ...) enforce their refinements
//! inside their `Deserialize` impls, so a successful decode always yields
//! the domain shape, never the wire shape.
//!
//! Decode failures are wrapped into a `SchemaError` carrying `{path,
//! message}` issues plus the offending input with secret fields redacted —
//! the raw serde error never escapes.

use relay_errors::{Error, InternalError, SchemaIssue};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Replace the values of matching keys with `"[redacted]"`, recursively.
#[must_use]
pub fn redact(value: &Value, keys: &[String]) -> Value {
    match value {
        Value::Object(map) => {
            let redacted = map
                .iter()
                .map(|(k, v)| {
                    if keys.iter().any(|key| key == k) {
                        (k.clone(), Value::String("[redacted]".into()))
                    } else {
                        (k.clone(), redact(v, keys))
                    }
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact(v, keys)).collect()),
        other => other.clone(),
    }
}

/// Decode a record into `T`.
///
/// # Errors
///
/// Returns a `SchemaError` internal error on decode failure; `redact_keys`
/// are elided from the offending input it carries.
pub fn decode_value<T>(value: Value, redact_keys: &[String]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let input = redact(&value, redact_keys);
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(decoded) => Ok(decoded),
        Err(err) => {
            let path: Vec<String> = err
                .path()
                .iter()
                .map(std::string::ToString::to_string)
                .collect();
            let message = err.into_inner().to_string();
            let issue = SchemaIssue::new(path, message);
            Err(InternalError::schema_decode(vec![issue], input).into())
        }
    }
}
