//! C-ABI wrapper around `courier-core`.
//!
//! # Overview
//! Exposes request resolution, response normalization, status helpers and
//! dot-path JSON decoding through `extern "C"` functions, so a host with its
//! own HTTP stack can share the exact request bytes and response shape
//! without linking to Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The host does the I/O: `courier_build_request` yields what to send,
//!   `courier_normalize_response` / `courier_normalize_failure` turn what
//!   came back into an `FfiNormalizedResponse`.
//! - The C caller owns all returned pointers and must call the matching
//!   `courier_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;

use courier_core::{
    build_request, decode_json_path, is_success_status, normalize_response, status_text,
    NormalizedResponse,
};

use types::*;

// ---------------------------------------------------------------------------
// Request resolution
// ---------------------------------------------------------------------------

/// Default request options: 30 s timeout, JSON, redirects followed (max 5),
/// TLS verified, no debug output.
#[unsafe(no_mangle)]
pub extern "C" fn courier_default_options() -> FfiRequestOptions {
    FfiRequestOptions::default()
}

/// Resolve URL, headers and body for one request.
///
/// Returns null if `spec` or its `url` is null, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `courier_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn courier_build_request(spec: *const FfiRequestSpec) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if spec.is_null() {
            return std::ptr::null_mut();
        }
        let spec = unsafe { &*spec };
        if spec.url.is_null() {
            return std::ptr::null_mut();
        }
        let core_spec = unsafe { spec.to_core() };
        FfiHttpRequest::from_core(build_request(&core_spec))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Response normalization
// ---------------------------------------------------------------------------

/// Normalize a response the host received for a request to `request_url`.
///
/// `duration_seconds` is the time the host measured from send to receipt.
/// Returns null if `response` is null. The caller must free the returned
/// pointer with `courier_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn courier_normalize_response(
    response: *const FfiHttpResponse,
    request_url: *const c_char,
    duration_seconds: f64,
) -> *mut FfiNormalizedResponse {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        let core_resp = unsafe { (*response).to_core() };
        let url = unsafe { read_str(request_url) };
        let normalized =
            normalize_response(Ok(core_resp), &url, duration_from_secs(duration_seconds));
        FfiNormalizedResponse::from_core(normalized)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the response for a request that never got an HTTP answer
/// (connect error, timeout). `status_code` is `-1`.
#[unsafe(no_mangle)]
pub extern "C" fn courier_normalize_failure(
    error_message: *const c_char,
    request_url: *const c_char,
    duration_seconds: f64,
) -> *mut FfiNormalizedResponse {
    catch_unwind(|| {
        let message = unsafe { read_str(error_message) };
        let url = unsafe { read_str(request_url) };
        FfiNormalizedResponse::from_core(NormalizedResponse::transport_failure(
            message,
            &url,
            duration_from_secs(duration_seconds),
        ))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Status helpers
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn courier_is_success_status(code: i32) -> bool {
    is_success_status(code)
}

/// Reason phrase for `code`. Free with `courier_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn courier_status_text(code: i32) -> *mut c_char {
    catch_unwind(|| to_c_string(status_text(code))).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// JSON decoding
// ---------------------------------------------------------------------------

/// Extract the value at a dot-path from a JSON document.
///
/// A null `json` decodes as `Failed`; a null `path` is the empty path.
/// The caller must free the result with `courier_free_decode_result`.
#[unsafe(no_mangle)]
pub extern "C" fn courier_decode_json(
    json: *const c_char,
    path: *const c_char,
) -> *mut FfiDecodeResult {
    catch_unwind(|| {
        if json.is_null() {
            return FfiDecodeResult::failed();
        }
        let json = unsafe { read_str(json) };
        let path = unsafe { read_str(path) };
        FfiDecodeResult::from_core(decode_json_path(&json, &path))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `courier_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn courier_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.url);
            free_c_string(req.body);
            free_pairs(req.headers, req.headers_len);
        }
    });
}

/// Free an `FfiNormalizedResponse` returned by either normalize function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn courier_free_response(resp: *mut FfiNormalizedResponse) {
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let resp = unsafe { Box::from_raw(resp) };
        unsafe {
            free_c_string(resp.status_text);
            free_c_string(resp.data);
            free_c_string(resp.error_message);
            free_c_string(resp.content_type);
            free_c_string(resp.final_url);
            free_pairs(resp.headers, resp.headers_len);
        }
    });
}

/// Free an `FfiDecodeResult` returned by `courier_decode_json`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn courier_free_decode_result(result: *mut FfiDecodeResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.scalar);
            free_pairs(result.fields, result.fields_len);
            for value in from_raw_array(result.values, result.values_len) {
                free_c_string(value);
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn courier_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
