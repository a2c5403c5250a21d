//! Dot-path extraction from JSON documents.
//!
//! `decode_json_path(text, "data.user")` walks object fields named by each
//! segment and classifies whatever the last segment lands on. Only object
//! field names are supported; there is no indexing, wildcard or escaping, so
//! keys containing a literal `.` cannot be addressed.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::KeyValue;

/// Shape of the value found at a dot-path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeResult {
    Failed,
    ScalarValue(String),
    ObjectFields(Vec<KeyValue>),
    ArrayValues(Vec<String>),
}

impl DecodeResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, DecodeResult::Failed)
    }
}

/// Parse `json` and extract the value at `path`.
///
/// An empty path returns the root's fields. Empty segments (`a..b`) are
/// skipped; a path made only of dots addresses nothing and fails.
pub fn decode_json_path(json: &str, path: &str) -> DecodeResult {
    let root: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "json decode failed to parse input");
            return DecodeResult::Failed;
        }
    };
    let Value::Object(root) = root else {
        return DecodeResult::Failed;
    };

    if path.is_empty() {
        return object_fields(&root);
    }

    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return DecodeResult::Failed;
    };

    let mut current = &root;
    for segment in parents {
        match current.get(*segment) {
            Some(Value::Object(next)) => current = next,
            _ => return DecodeResult::Failed,
        }
    }

    match current.get(*last) {
        Some(Value::Object(object)) => object_fields(object),
        Some(Value::Array(items)) => {
            DecodeResult::ArrayValues(items.iter().map(stringify).collect())
        }
        Some(Value::Null) | None => DecodeResult::Failed,
        Some(scalar) => DecodeResult::ScalarValue(stringify(scalar)),
    }
}

fn object_fields(object: &Map<String, Value>) -> DecodeResult {
    if object.is_empty() {
        return DecodeResult::Failed;
    }
    DecodeResult::ObjectFields(
        object
            .iter()
            .map(|(k, v)| KeyValue::new(k.as_str(), stringify(v)))
            .collect(),
    )
}

/// Scalars become their plain text; nested containers become compact JSON;
/// null becomes an empty string.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
    }
}
