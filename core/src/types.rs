//! Caller-facing value types: key/value pairs, header selectors, content
//! types, request options and the normalized response.
//!
//! # Design
//! Header names and content types are closed enums with a `Custom` variant
//! that carries its own string, so a "custom" selector can never exist
//! without the name it refers to. An empty custom string is still
//! representable (hosts pass whatever they have) and is dropped during
//! resolution rather than failing the call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// A single key/value pair, used for headers, query parameters and body
/// fields alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub fn make_key_value(key: &str, value: &str) -> KeyValue {
    KeyValue::new(key, value)
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for KeyValue {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Well-known request header names, plus an escape hatch for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderKey {
    Authorization,
    ContentType,
    Accept,
    UserAgent,
    AcceptLanguage,
    AcceptEncoding,
    CacheControl,
    Connection,
    Cookie,
    Host,
    Origin,
    Referer,
    XRequestedWith,
    XApiKey,
    XAuthToken,
    XCsrfToken,
    Custom(String),
}

impl HeaderKey {
    /// The canonical header name, or `None` for a `Custom` key with an
    /// empty (or whitespace-only) name.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            HeaderKey::Authorization => "Authorization",
            HeaderKey::ContentType => "Content-Type",
            HeaderKey::Accept => "Accept",
            HeaderKey::UserAgent => "User-Agent",
            HeaderKey::AcceptLanguage => "Accept-Language",
            HeaderKey::AcceptEncoding => "Accept-Encoding",
            HeaderKey::CacheControl => "Cache-Control",
            HeaderKey::Connection => "Connection",
            HeaderKey::Cookie => "Cookie",
            HeaderKey::Host => "Host",
            HeaderKey::Origin => "Origin",
            HeaderKey::Referer => "Referer",
            HeaderKey::XRequestedWith => "X-Requested-With",
            HeaderKey::XApiKey => "X-API-Key",
            HeaderKey::XAuthToken => "X-Auth-Token",
            HeaderKey::XCsrfToken => "X-CSRF-Token",
            HeaderKey::Custom(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
            }
        };
        Some(name)
    }
}

/// A header selected from the well-known table (or a custom name) with its
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: HeaderKey,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: HeaderKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Body content type. Selects both the `Content-Type` header value and the
/// body encoding strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    Json,
    Xml,
    FormUrlEncoded,
    Multipart,
    TextPlain,
    TextHtml,
    TextXml,
    Custom(String),
}

impl ContentType {
    /// The MIME string sent in `Content-Type`, or `None` for an empty custom
    /// value.
    pub fn mime(&self) -> Option<&str> {
        let mime = match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::Multipart => "multipart/form-data",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
            ContentType::TextXml => "text/xml",
            ContentType::Custom(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
            }
        };
        Some(mime)
    }
}

/// How much diagnostic output a dispatched request produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DebugLevel {
    #[default]
    None,
    /// Console only.
    Basic,
    /// Console plus a report file.
    Detailed,
    /// Console with full headers and payloads, plus a report file.
    Verbose,
}

/// Per-request knobs. Deserializes from partial JSON; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// `0` disables the timeout.
    pub timeout_seconds: u32,
    pub content_type: ContentType,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub verify_tls: bool,
    pub debug_level: DebugLevel,
    /// Percent-encode each body-field value before serializing it.
    pub encode_payload: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            content_type: ContentType::Json,
            follow_redirects: true,
            max_redirects: 5,
            verify_tls: true,
            debug_level: DebugLevel::None,
            encode_payload: false,
        }
    }
}

impl RequestOptions {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }
}

/// Declarative description of one HTTP call, before resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<HeaderEntry>,
    pub custom_headers: Vec<KeyValue>,
    pub query: Vec<KeyValue>,
    pub body: Vec<KeyValue>,
    /// Pre-serialized body. Takes the place of `body` field encoding.
    pub raw_body: Option<String>,
    pub options: RequestOptions,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, key: HeaderKey, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(key, value));
        self
    }

    pub fn custom_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push(KeyValue::new(key, value));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(KeyValue::new(key, value));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.push(KeyValue::new(key, value));
        self
    }

    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// The outcome of one dispatched request, as handed to the caller.
///
/// `success` holds only when the transport completed and the status code is
/// 2xx. Transport failures carry `status_code == -1` and a non-empty
/// `error_message`; HTTP failures keep the full server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub success: bool,
    pub status_code: i32,
    pub status_text: String,
    pub data: String,
    pub error_message: String,
    pub headers: Vec<KeyValue>,
    pub duration_seconds: f64,
    pub content_length: i64,
    pub content_type: String,
    pub final_url: String,
}

impl NormalizedResponse {
    /// A response describing a transport-level failure.
    pub fn transport_failure(message: impl Into<String>, url: &str, duration: Duration) -> Self {
        Self {
            success: false,
            status_code: -1,
            status_text: crate::status::status_text(-1).to_string(),
            data: String::new(),
            error_message: message.into(),
            headers: Vec::new(),
            duration_seconds: duration.as_secs_f64(),
            content_length: 0,
            content_type: String::new(),
            final_url: url.to_string(),
        }
    }
}
