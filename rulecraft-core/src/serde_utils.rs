use crate::errors::{CoreError, Result};

/// Serializes a value to pretty JSON with canonical error handling.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| CoreError::SerializationError(err.to_string()))
}

/// Deserializes a JSON string into the provided type with shared error semantics.
pub fn from_json_str<T: serde::de::DeserializeOwned>(input: &str) -> Result<T> {
    serde_json::from_str(input).map_err(|err| CoreError::DeserializationError(err.to_string()))
}

/// Reads a file holding JSON documents.
///
/// With `split_arrays`, a top-level array is treated as a list of documents
/// instead of a single array-shaped document.
pub fn read_documents(
    path: &std::path::Path,
    split_arrays: bool,
) -> Result<Vec<serde_json::Value>> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = from_json_str(&raw)?;
    match value {
        serde_json::Value::Array(items) if split_arrays => Ok(items),
        other => Ok(vec![other]),
    }
}
