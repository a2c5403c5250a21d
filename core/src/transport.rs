//! The seam between the dispatcher and whatever actually moves bytes.
//!
//! # Design
//! `Transport` is the only place network I/O happens. The bundled
//! `UreqTransport` runs a blocking `ureq` agent on tokio's blocking pool so
//! async callers are never stalled; hosts with their own HTTP stack
//! implement the trait instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{RequestBuilder, ResponseExt};

use crate::error::TransportError;
use crate::headers::HeaderMap;
use crate::http::{HttpMethod, HttpResponse, ResolvedRequest, TransportSettings};
use crate::types::KeyValue;

/// Executes one resolved request.
///
/// Implementations report a missing response or any network-level failure
/// as `Err`; any HTTP status, including 4xx/5xx, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: &ResolvedRequest,
        settings: &TransportSettings,
    ) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(
        &self,
        request: &ResolvedRequest,
        settings: &TransportSettings,
    ) -> Result<HttpResponse, TransportError> {
        (**self).execute(request, settings).await
    }
}

/// Response bodies larger than this are dropped rather than buffered.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// `Transport` backed by a blocking `ureq` agent.
#[derive(Debug, Clone, Copy)]
pub struct UreqTransport {
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self { body_limit: MAX_BODY_BYTES }
    }

    /// Cap on buffered response bytes. A body over the cap comes back
    /// empty; status and headers are still reported.
    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(
        &self,
        request: &ResolvedRequest,
        settings: &TransportSettings,
    ) -> Result<HttpResponse, TransportError> {
        let request = request.clone();
        let settings = *settings;
        let transport = *self;
        tokio::task::spawn_blocking(move || transport.execute_blocking(&request, &settings))
            .await
            .map_err(|e| TransportError::Other(format!("transport task failed: {e}")))?
    }
}

impl UreqTransport {
    /// Run `request` on the calling thread.
    pub fn execute_blocking(
        &self,
        request: &ResolvedRequest,
        settings: &TransportSettings,
    ) -> Result<HttpResponse, TransportError> {
        let agent = agent(settings);
        let url = request.url.as_str();

        let result = match request.method {
            HttpMethod::Get => without_body(agent.get(url), &request.headers),
            HttpMethod::Delete => without_body(agent.delete(url), &request.headers),
            HttpMethod::Post => with_body(agent.post(url), &request.headers, &request.body),
            HttpMethod::Put => with_body(agent.put(url), &request.headers, &request.body),
            HttpMethod::Patch => with_body(agent.patch(url), &request.headers, &request.body),
        };

        let mut response = result.map_err(|e| map_error(e, settings))?;

        let headers = header_pairs(response.headers());
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        };
        let content_type = header("content-type").unwrap_or_default();
        let content_length = header("content-length").and_then(|v| v.trim().parse().ok());
        let status = response.status().as_u16();
        let final_url = response.get_uri().to_string();

        // The status line already arrived; a body that cannot be read is
        // reported as empty instead of turning the exchange into a failure.
        let body = match response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
        {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(status, error = %e, "could not read response body, reporting it empty");
                String::new()
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
            content_length,
            content_type,
            final_url: Some(final_url),
        })
    }
}

/// Header values are not required to be ASCII; invalid UTF-8 is replaced
/// rather than dropped.
fn header_pairs(headers: &ureq::http::HeaderMap) -> Vec<KeyValue> {
    headers
        .iter()
        .map(|(k, v)| KeyValue::new(k.as_str(), String::from_utf8_lossy(v.as_bytes())))
        .collect()
}

/// Status codes are data here, not errors; the dispatcher classifies them.
fn agent(settings: &TransportSettings) -> ureq::Agent {
    let max_redirects = if settings.follow_redirects {
        settings.max_redirects
    } else {
        0
    };
    let mut config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(settings.timeout)
        .max_redirects(max_redirects)
        .max_redirects_will_error(settings.follow_redirects);
    if !settings.verify_tls {
        config = config.tls_config(
            ureq::tls::TlsConfig::builder()
                .disable_verification(true)
                .build(),
        );
    }
    config.build().new_agent()
}

fn without_body(
    mut builder: RequestBuilder<WithoutBody>,
    headers: &HeaderMap,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder.call()
}

fn with_body(
    mut builder: RequestBuilder<WithBody>,
    headers: &HeaderMap,
    body: &str,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    if body.is_empty() {
        builder.send_empty()
    } else {
        builder.send(body.as_bytes())
    }
}

fn map_error(err: ureq::Error, settings: &TransportSettings) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout {
            seconds: settings.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        },
        ureq::Error::HostNotFound => TransportError::Connect("host not found".to_string()),
        ureq::Error::ConnectionFailed => TransportError::Connect("connection refused".to_string()),
        ureq::Error::Io(e) => TransportError::Io(e.to_string()),
        other => TransportError::Other(other.to_string()),
    }
}
