//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! dispatcher builds a `ResolvedRequest` and hands it to whatever
//! `Transport` the host plugged in; the transport answers with an
//! `HttpResponse` that the dispatcher normalizes. Hosts that do their own
//! I/O (see the FFI crate) use the same two types directly.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;
use crate::types::{KeyValue, RequestOptions};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a body.
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully computed outbound request, ready for the transport.
///
/// `body` is always empty for GET and DELETE.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

/// Connection knobs passed through to the transport unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub verify_tls: bool,
}

impl From<&RequestOptions> for TransportSettings {
    fn from(options: &RequestOptions) -> Self {
        Self {
            timeout: options.timeout(),
            follow_redirects: options.follow_redirects,
            max_redirects: options.max_redirects,
            verify_tls: options.verify_tls,
        }
    }
}

/// A raw HTTP response as reported by the transport.
///
/// Constructed by the transport (or by a host doing its own I/O) and passed
/// to `normalize_response`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<KeyValue>,
    pub body: String,
    /// `None` when the server sent no `Content-Length`.
    pub content_length: Option<u64>,
    pub content_type: String,
    /// URL after redirects, when the transport tracks it.
    pub final_url: Option<String>,
}
