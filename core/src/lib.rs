//! Declarative HTTP request dispatch and dot-path JSON decoding.
//!
//! # Overview
//! A caller describes a request as a `RequestSpec` (method, URL, query
//! parameters, headers from several sources, body fields, options).
//! `build_request` resolves it into a single `ResolvedRequest`; a
//! `Dispatcher` sends that through a `Transport` without blocking the
//! caller and hands back a `NormalizedResponse`. Separately,
//! `decode_json_path` pulls a scalar, an object's fields or an array's
//! elements out of a JSON document by dot-path.
//!
//! # Design
//! - Resolution and normalization are pure functions, so hosts that do
//!   their own I/O (see the FFI crate) can use them without a runtime.
//! - Failures are values: transport errors and non-2xx statuses come back
//!   as an unsuccessful `NormalizedResponse`, decode errors as
//!   `DecodeResult::Failed`.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod client;
pub mod debug;
pub mod encode;
pub mod error;
pub mod headers;
pub mod http;
pub mod json_path;
pub mod status;
pub mod transport;
pub mod types;

pub use client::{build_request, normalize_response, Dispatcher, PendingResponse};
pub use debug::{ConsoleReporter, DebugReporter, DefaultReporter, FileReporter};
pub use encode::{build_url, encode_body, percent_encode, EncodedBody};
pub use error::{DispatchError, ReportError, TransportError};
pub use headers::{
    default_json_headers, make_api_key, make_bearer_token, make_content_type_header, make_header,
    resolve_headers, HeaderMap, DEFAULT_JSON_HEADERS,
};
pub use http::{HttpMethod, HttpResponse, ResolvedRequest, TransportSettings};
pub use json_path::{decode_json_path, DecodeResult};
pub use status::{is_success_status, status_text};
pub use transport::{Transport, UreqTransport, MAX_BODY_BYTES};
pub use types::{
    make_key_value, ContentType, DebugLevel, HeaderEntry, HeaderKey, KeyValue, NormalizedResponse,
    RequestOptions, RequestSpec,
};
