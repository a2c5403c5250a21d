//! Error types used at the internal seams of the dispatcher.
//!
//! # Design
//! None of these reach a caller of `send_request` as an `Err`: transport
//! errors are folded into a failed `NormalizedResponse` (their `Display`
//! text becomes `error_message`) and report errors are logged and dropped.
//! `DispatchError` only surfaces when constructing a dispatcher.

use thiserror::Error;

/// Failure reported by a `Transport` instead of a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport completed without producing a response object.
    #[error("no response")]
    NoResponse,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

/// Errors building a dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No tokio runtime was running and none was supplied.
    #[error("no async runtime available for dispatch")]
    NoRuntime,
}

/// Failure writing a debug report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write debug report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
