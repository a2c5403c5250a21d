//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! enums with explicit discriminants. Inputs borrow caller memory
//! (`*const`); outputs are allocated here (`*mut`) and released by the
//! matching `courier_free_*` function. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::time::Duration;

use courier_core::{
    ContentType, DebugLevel, DecodeResult, HeaderEntry, HeaderKey, HttpMethod, HttpResponse,
    KeyValue, NormalizedResponse, RequestOptions, RequestSpec, ResolvedRequest,
};

// ---------------------------------------------------------------------------
// String and array helpers
// ---------------------------------------------------------------------------

/// Allocate a C string. Interior NUL bytes are dropped rather than failing.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut bytes = s.into().into_bytes();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Read a caller-owned C string. Null reads as empty; invalid UTF-8 is
/// replaced.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Like `read_str`, but null stays `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_opt_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { read_str(ptr) })
    }
}

/// View a caller-owned array. Null or zero length is empty.
///
/// # Safety
/// When non-null, `ptr` must point to `len` initialized values.
unsafe fn slice<'a, T>(ptr: *const T, len: u32) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len as usize) }
    }
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
fn into_raw_array<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let boxed = items.into_boxed_slice();
    (Box::into_raw(boxed) as *mut T, len)
}

/// Take back an array produced by `into_raw_array`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_array` and not have been freed.
pub(crate) unsafe fn from_raw_array<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

/// Free a C string allocated by `to_c_string`. Null is ignored.
///
/// # Safety
/// `ptr` must be null or come from `to_c_string`.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Patch => HttpMethod::Patch,
        }
    }
}

/// Well-known header selector. `Custom` takes its name from
/// `FfiHeaderEntry::custom_name`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHeaderKey {
    Authorization = 0,
    ContentType = 1,
    Accept = 2,
    UserAgent = 3,
    AcceptLanguage = 4,
    AcceptEncoding = 5,
    CacheControl = 6,
    Connection = 7,
    Cookie = 8,
    Host = 9,
    Origin = 10,
    Referer = 11,
    XRequestedWith = 12,
    XApiKey = 13,
    XAuthToken = 14,
    XCsrfToken = 15,
    Custom = 16,
}

impl FfiHeaderKey {
    fn to_core(self, custom_name: String) -> HeaderKey {
        match self {
            FfiHeaderKey::Authorization => HeaderKey::Authorization,
            FfiHeaderKey::ContentType => HeaderKey::ContentType,
            FfiHeaderKey::Accept => HeaderKey::Accept,
            FfiHeaderKey::UserAgent => HeaderKey::UserAgent,
            FfiHeaderKey::AcceptLanguage => HeaderKey::AcceptLanguage,
            FfiHeaderKey::AcceptEncoding => HeaderKey::AcceptEncoding,
            FfiHeaderKey::CacheControl => HeaderKey::CacheControl,
            FfiHeaderKey::Connection => HeaderKey::Connection,
            FfiHeaderKey::Cookie => HeaderKey::Cookie,
            FfiHeaderKey::Host => HeaderKey::Host,
            FfiHeaderKey::Origin => HeaderKey::Origin,
            FfiHeaderKey::Referer => HeaderKey::Referer,
            FfiHeaderKey::XRequestedWith => HeaderKey::XRequestedWith,
            FfiHeaderKey::XApiKey => HeaderKey::XApiKey,
            FfiHeaderKey::XAuthToken => HeaderKey::XAuthToken,
            FfiHeaderKey::XCsrfToken => HeaderKey::XCsrfToken,
            FfiHeaderKey::Custom => HeaderKey::Custom(custom_name),
        }
    }
}

/// Body content type. `Custom` takes its MIME string from
/// `FfiRequestOptions::custom_content_type`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiContentType {
    Json = 0,
    Xml = 1,
    FormUrlEncoded = 2,
    Multipart = 3,
    TextPlain = 4,
    TextHtml = 5,
    TextXml = 6,
    Custom = 7,
}

impl FfiContentType {
    fn to_core(self, custom: String) -> ContentType {
        match self {
            FfiContentType::Json => ContentType::Json,
            FfiContentType::Xml => ContentType::Xml,
            FfiContentType::FormUrlEncoded => ContentType::FormUrlEncoded,
            FfiContentType::Multipart => ContentType::Multipart,
            FfiContentType::TextPlain => ContentType::TextPlain,
            FfiContentType::TextHtml => ContentType::TextHtml,
            FfiContentType::TextXml => ContentType::TextXml,
            FfiContentType::Custom => ContentType::Custom(custom),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDebugLevel {
    None = 0,
    Basic = 1,
    Detailed = 2,
    Verbose = 3,
}

impl From<FfiDebugLevel> for DebugLevel {
    fn from(level: FfiDebugLevel) -> Self {
        match level {
            FfiDebugLevel::None => DebugLevel::None,
            FfiDebugLevel::Basic => DebugLevel::Basic,
            FfiDebugLevel::Detailed => DebugLevel::Detailed,
            FfiDebugLevel::Verbose => DebugLevel::Verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Request input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A borrowed key/value pair of C strings.
#[repr(C)]
pub struct FfiKeyValue {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// A header picked from the well-known table, or a custom one.
#[repr(C)]
pub struct FfiHeaderEntry {
    pub key: FfiHeaderKey,
    /// Only read when `key` is `Custom`.
    pub custom_name: *const c_char,
    pub value: *const c_char,
}

/// Request options. Obtain defaults from `courier_default_options`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiRequestOptions {
    /// `0` disables the timeout.
    pub timeout_seconds: u32,
    pub content_type: FfiContentType,
    /// Only read when `content_type` is `Custom`.
    pub custom_content_type: *const c_char,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub verify_tls: bool,
    pub debug_level: FfiDebugLevel,
    pub encode_payload: bool,
}

impl Default for FfiRequestOptions {
    fn default() -> Self {
        let core = RequestOptions::default();
        Self {
            timeout_seconds: core.timeout_seconds,
            content_type: FfiContentType::Json,
            custom_content_type: std::ptr::null(),
            follow_redirects: core.follow_redirects,
            max_redirects: core.max_redirects,
            verify_tls: core.verify_tls,
            debug_level: FfiDebugLevel::None,
            encode_payload: core.encode_payload,
        }
    }
}

impl FfiRequestOptions {
    /// # Safety
    /// `custom_content_type` must be null or a valid C string.
    pub(crate) unsafe fn to_core(&self) -> RequestOptions {
        let custom = unsafe { read_str(self.custom_content_type) };
        RequestOptions {
            timeout_seconds: self.timeout_seconds,
            content_type: self.content_type.to_core(custom),
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            verify_tls: self.verify_tls,
            debug_level: self.debug_level.into(),
            encode_payload: self.encode_payload,
        }
    }
}

/// Everything needed to resolve one request.
///
/// Array pointers may be null when their length is zero. `raw_body` may be
/// null; when set it is sent verbatim instead of encoding `body`.
#[repr(C)]
pub struct FfiRequestSpec {
    pub method: FfiHttpMethod,
    pub url: *const c_char,
    pub headers: *const FfiHeaderEntry,
    pub headers_len: u32,
    pub custom_headers: *const FfiKeyValue,
    pub custom_headers_len: u32,
    pub query: *const FfiKeyValue,
    pub query_len: u32,
    pub body: *const FfiKeyValue,
    pub body_len: u32,
    pub raw_body: *const c_char,
    pub options: FfiRequestOptions,
}

/// # Safety
/// `ptr` must be null or point to `len` pairs of valid C strings.
unsafe fn read_pairs(ptr: *const FfiKeyValue, len: u32) -> Vec<KeyValue> {
    unsafe { slice(ptr, len) }
        .iter()
        .map(|kv| unsafe { KeyValue::new(read_str(kv.key), read_str(kv.value)) })
        .collect()
}

impl FfiRequestSpec {
    /// # Safety
    /// Every pointer must be null or valid for its stated length.
    pub(crate) unsafe fn to_core(&self) -> RequestSpec {
        let headers = unsafe { slice(self.headers, self.headers_len) }
            .iter()
            .map(|entry| unsafe {
                HeaderEntry::new(
                    entry.key.to_core(read_str(entry.custom_name)),
                    read_str(entry.value),
                )
            })
            .collect();

        unsafe {
            RequestSpec {
                url: read_str(self.url),
                method: self.method.into(),
                headers,
                custom_headers: read_pairs(self.custom_headers, self.custom_headers_len),
                query: read_pairs(self.query, self.query_len),
                body: read_pairs(self.body, self.body_len),
                raw_body: read_opt_str(self.raw_body),
                options: self.options.to_core(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided)
// ---------------------------------------------------------------------------

/// A raw HTTP response the host received after executing an
/// `FfiHttpRequest`.
///
/// The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiKeyValue,
    pub headers_len: u32,
    pub body: *const c_char,
    /// Negative when the server sent no `Content-Length`.
    pub content_length: i64,
    pub content_type: *const c_char,
    /// Null when the host does not track redirects.
    pub final_url: *const c_char,
}

impl FfiHttpResponse {
    /// # Safety
    /// Every pointer must be null or valid for its stated length.
    pub(crate) unsafe fn to_core(&self) -> HttpResponse {
        unsafe {
            HttpResponse {
                status: self.status,
                headers: read_pairs(self.headers, self.headers_len),
                body: read_str(self.body),
                content_length: u64::try_from(self.content_length).ok(),
                content_type: read_str(self.content_type),
                final_url: read_opt_str(self.final_url),
            }
        }
    }
}

/// Seconds from C into a `Duration`. Negative or non-finite reads as zero.
pub(crate) fn duration_from_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Outputs (allocated here, freed by `courier_free_*`)
// ---------------------------------------------------------------------------

/// An owned key/value pair of C strings.
#[repr(C)]
pub struct FfiPair {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

fn into_raw_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> (*mut FfiPair, u32) {
    into_raw_array(
        pairs
            .into_iter()
            .map(|(key, value)| FfiPair {
                key: to_c_string(key),
                value: to_c_string(value),
            })
            .collect(),
    )
}

fn key_values_into_raw(pairs: Vec<KeyValue>) -> (*mut FfiPair, u32) {
    into_raw_pairs(pairs.into_iter().map(|kv| (kv.key, kv.value)))
}

/// # Safety
/// `ptr`/`len` must come from `into_raw_pairs`.
pub(crate) unsafe fn free_pairs(ptr: *mut FfiPair, len: u32) {
    for pair in unsafe { from_raw_array(ptr, len) } {
        unsafe {
            free_c_string(pair.key);
            free_c_string(pair.value);
        }
    }
}

/// A resolved request, ready for the host to execute.
///
/// `body` is never null; it is empty for GET and DELETE.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiPair,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `ResolvedRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: ResolvedRequest) -> *mut Self {
        let headers: Vec<(String, String)> = req.headers.into();
        let (headers, headers_len) = into_raw_pairs(headers);
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c_string(req.url),
            headers,
            headers_len,
            body: to_c_string(req.body),
        }))
    }
}

/// The caller-facing response. String fields are never null.
#[repr(C)]
pub struct FfiNormalizedResponse {
    pub success: bool,
    /// `-1` when no HTTP response was received.
    pub status_code: i32,
    pub status_text: *mut c_char,
    pub data: *mut c_char,
    pub error_message: *mut c_char,
    pub headers: *mut FfiPair,
    pub headers_len: u32,
    pub duration_seconds: f64,
    pub content_length: i64,
    pub content_type: *mut c_char,
    pub final_url: *mut c_char,
}

impl FfiNormalizedResponse {
    pub(crate) fn from_core(resp: NormalizedResponse) -> *mut Self {
        let (headers, headers_len) = key_values_into_raw(resp.headers);
        Box::into_raw(Box::new(FfiNormalizedResponse {
            success: resp.success,
            status_code: resp.status_code,
            status_text: to_c_string(resp.status_text),
            data: to_c_string(resp.data),
            error_message: to_c_string(resp.error_message),
            headers,
            headers_len,
            duration_seconds: resp.duration_seconds,
            content_length: resp.content_length,
            content_type: to_c_string(resp.content_type),
            final_url: to_c_string(resp.final_url),
        }))
    }
}

/// Tag that tells the caller which `FfiDecodeResult` fields are populated.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDecodeKind {
    Failed = 0,
    ScalarValue = 1,
    ObjectFields = 2,
    ArrayValues = 3,
}

/// Outcome of `courier_decode_json`.
///
/// - `ScalarValue`: `scalar` is set.
/// - `ObjectFields`: `fields` / `fields_len` are set.
/// - `ArrayValues`: `values` / `values_len` are set.
///
/// Unused pointers are null.
#[repr(C)]
pub struct FfiDecodeResult {
    pub kind: FfiDecodeKind,
    pub scalar: *mut c_char,
    pub fields: *mut FfiPair,
    pub fields_len: u32,
    pub values: *mut *mut c_char,
    pub values_len: u32,
}

impl FfiDecodeResult {
    pub(crate) fn from_core(result: DecodeResult) -> *mut Self {
        let mut out = FfiDecodeResult {
            kind: FfiDecodeKind::Failed,
            scalar: std::ptr::null_mut(),
            fields: std::ptr::null_mut(),
            fields_len: 0,
            values: std::ptr::null_mut(),
            values_len: 0,
        };
        match result {
            DecodeResult::Failed => {}
            DecodeResult::ScalarValue(value) => {
                out.kind = FfiDecodeKind::ScalarValue;
                out.scalar = to_c_string(value);
            }
            DecodeResult::ObjectFields(fields) => {
                out.kind = FfiDecodeKind::ObjectFields;
                (out.fields, out.fields_len) = key_values_into_raw(fields);
            }
            DecodeResult::ArrayValues(values) => {
                out.kind = FfiDecodeKind::ArrayValues;
                (out.values, out.values_len) =
                    into_raw_array(values.into_iter().map(to_c_string).collect());
            }
        }
        Box::into_raw(Box::new(out))
    }

    pub(crate) fn failed() -> *mut Self {
        Self::from_core(DecodeResult::Failed)
    }
}
