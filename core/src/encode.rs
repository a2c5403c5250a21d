//! Body encoding and query-string construction.
//!
//! Percent-encoding leaves the unreserved set (`A-Z a-z 0-9 - _ . ~`)
//! untouched and escapes every other byte as uppercase `%XX`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::http::HttpMethod;
use crate::types::{ContentType, KeyValue};

/// Serialized body plus the `Content-Type` it was encoded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub body: String,
    /// `None` when no body-related header applies (GET/DELETE, or an empty
    /// custom content type).
    pub content_type: Option<String>,
}

impl EncodedBody {
    fn empty() -> Self {
        Self {
            body: String::new(),
            content_type: None,
        }
    }
}

pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Encode body fields for `method` according to `content_type`.
///
/// A `raw_body` is sent verbatim in place of field encoding.
/// `encode_payload` percent-encodes each field value before JSON
/// serialization.
pub fn encode_body(
    method: HttpMethod,
    content_type: &ContentType,
    fields: &[KeyValue],
    raw_body: Option<&str>,
    encode_payload: bool,
) -> EncodedBody {
    if !method.has_body() {
        return EncodedBody::empty();
    }

    let header = content_type.mime().map(str::to_string);
    if header.is_none() {
        warn!("custom content type is empty, keeping the default Content-Type");
    }

    if let Some(raw) = raw_body {
        return EncodedBody {
            body: raw.to_string(),
            content_type: header,
        };
    }

    let body = match content_type {
        ContentType::Json => encode_json(fields, encode_payload),
        ContentType::FormUrlEncoded => encode_form(fields),
        _ => passthrough(fields),
    };

    EncodedBody {
        body,
        content_type: header,
    }
}

/// Flat JSON object of string fields, in input order. No fields gives an
/// empty body rather than `{}`.
fn encode_json(fields: &[KeyValue], encode_payload: bool) -> String {
    if fields.is_empty() {
        debug!("no body fields, skipping JSON encoding");
        return String::new();
    }
    let mut object = Map::with_capacity(fields.len());
    for field in fields {
        let value = if encode_payload {
            percent_encode(&field.value)
        } else {
            field.value.clone()
        };
        object.insert(field.key.clone(), Value::String(value));
    }
    Value::Object(object).to_string()
}

fn encode_form(fields: &[KeyValue]) -> String {
    fields
        .iter()
        .map(|f| format!("{}={}", percent_encode(&f.key), percent_encode(&f.value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Content types without a field encoding expect the caller to pass the
/// already serialized body as the value of a single field.
fn passthrough(fields: &[KeyValue]) -> String {
    if fields.len() > 1 {
        warn!(
            count = fields.len(),
            "content type takes a pre-serialized body, using the first field only"
        );
    }
    fields.first().map(|f| f.value.clone()).unwrap_or_default()
}

/// Append percent-encoded query parameters to `base`.
///
/// The base URL is not normalized or validated.
pub fn build_url(base: &str, params: &[KeyValue]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let query = params
        .iter()
        .map(|p| format!("{}={}", percent_encode(&p.key), percent_encode(&p.value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
