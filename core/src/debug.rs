//! Human-readable debug reports for dispatched requests.
//!
//! `Basic` logs a one-line summary, `Detailed` adds a report file, and
//! `Verbose` also logs the full report (headers and payloads) to the
//! console. Reporters run after the response has been handed to the
//! caller; their errors are logged by the dispatcher and go no further.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;
use uuid::Uuid;

use crate::error::ReportError;
use crate::http::{HttpMethod, ResolvedRequest};
use crate::types::{DebugLevel, NormalizedResponse, RequestOptions};

/// Directory the default reporter writes report files into.
pub const DEFAULT_REPORT_DIR: &str = "Saved/DebugHTTP";

/// Receives every request/response pair whose options ask for debugging.
pub trait DebugReporter: Send + Sync {
    fn report(
        &self,
        request: &ResolvedRequest,
        response: &NormalizedResponse,
        options: &RequestOptions,
    ) -> Result<(), ReportError>;
}

/// Render the full text report.
pub fn render_report(
    request: &ResolvedRequest,
    response: &NormalizedResponse,
    options: &RequestOptions,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "URL: {}", request.url);
    let _ = writeln!(out, "Method: {}", request.method);
    let _ = writeln!(out, "Timeout: {}s", options.timeout_seconds);
    out.push_str("Headers:\n");
    for (name, value) in request.headers.iter() {
        let _ = writeln!(out, "{name}: {value}");
    }
    out.push_str("Body:\n");
    if !request.body.is_empty() {
        let _ = writeln!(out, "{}", request.body);
    }

    out.push_str("\nServer Headers:\n");
    for header in &response.headers {
        let _ = writeln!(out, "{}: {}", header.key, header.value);
    }
    let _ = writeln!(out, "\nServer Payload:\n{}", response.data);
    let _ = writeln!(out, "Status Code: {} {}", response.status_code, response.status_text);
    let _ = writeln!(out, "Final URL: {}", response.final_url);
    let _ = writeln!(out, "Success: {}", response.success);
    let _ = writeln!(out, "Error Message: {}", response.error_message);
    let _ = writeln!(out, "Duration: {:.3}s", response.duration_seconds);
    out
}

/// Longest URL slug kept in a report file name, in bytes.
pub const MAX_SLUG_BYTES: usize = 100;

/// `<slug>-<METHOD>-<timestamp>-<id>.txt`.
///
/// The slug is the URL with path separators, `:`, query punctuation
/// (`? & =`), characters Windows rejects (`\ * " < > |`) and control
/// characters replaced by `_`, cut to `MAX_SLUG_BYTES` on a char boundary.
/// The uuid keeps cut names unique.
pub fn report_file_name(url: &str, method: HttpMethod, at: DateTime<Local>, id: Uuid) -> String {
    let mut slug = String::with_capacity(url.len().min(MAX_SLUG_BYTES));
    for c in url.chars() {
        let c = match c {
            '/' | ':' | '?' | '&' | '=' | '\\' | '*' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            other => other,
        };
        if slug.len() + c.len_utf8() > MAX_SLUG_BYTES {
            break;
        }
        slug.push(c);
    }
    format!(
        "{slug}-{method}-{}-{}.txt",
        at.format("%Y-%m-%d_%H-%M-%S"),
        id.simple()
    )
}

/// Logs reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl DebugReporter for ConsoleReporter {
    fn report(
        &self,
        request: &ResolvedRequest,
        response: &NormalizedResponse,
        options: &RequestOptions,
    ) -> Result<(), ReportError> {
        match options.debug_level {
            DebugLevel::None => {}
            DebugLevel::Verbose => {
                info!("http debug report\n{}", render_report(request, response, options));
            }
            DebugLevel::Basic | DebugLevel::Detailed => {
                info!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status_code,
                    success = response.success,
                    duration = response.duration_seconds,
                    error = %response.error_message,
                    "http request completed"
                );
            }
        }
        Ok(())
    }
}

/// Writes each report to its own file under `dir`.
#[derive(Debug, Clone)]
pub struct FileReporter {
    dir: PathBuf,
}

impl FileReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the report and return the file it landed in.
    pub fn write_report(
        &self,
        request: &ResolvedRequest,
        response: &NormalizedResponse,
        options: &RequestOptions,
    ) -> Result<PathBuf, ReportError> {
        let write_err = |path: &Path, source| ReportError::Write {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| write_err(&self.dir, e))?;

        let name = report_file_name(&request.url, request.method, Local::now(), Uuid::new_v4());
        let path = self.dir.join(name);
        std::fs::write(&path, render_report(request, response, options))
            .map_err(|e| write_err(&path, e))?;
        info!(path = %path.display(), "saved http debug report");
        Ok(path)
    }
}

impl DebugReporter for FileReporter {
    fn report(
        &self,
        request: &ResolvedRequest,
        response: &NormalizedResponse,
        options: &RequestOptions,
    ) -> Result<(), ReportError> {
        self.write_report(request, response, options).map(|_| ())
    }
}

/// Console output at every level, plus a file from `Detailed` up.
#[derive(Debug, Clone)]
pub struct DefaultReporter {
    console: ConsoleReporter,
    file: FileReporter,
}

impl DefaultReporter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            console: ConsoleReporter,
            file: FileReporter::new(report_dir),
        }
    }
}

impl Default for DefaultReporter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_DIR)
    }
}

impl DebugReporter for DefaultReporter {
    fn report(
        &self,
        request: &ResolvedRequest,
        response: &NormalizedResponse,
        options: &RequestOptions,
    ) -> Result<(), ReportError> {
        if options.debug_level == DebugLevel::None {
            return Ok(());
        }
        self.console.report(request, response, options)?;
        if options.debug_level >= DebugLevel::Detailed {
            self.file.report(request, response, options)?;
        }
        Ok(())
    }
}
