//! Request resolution, dispatch and response normalization.
//!
//! # Design
//! The pure halves live in free functions: `build_request` turns a
//! `RequestSpec` into a `ResolvedRequest`, and `normalize_response` turns a
//! transport result into a `NormalizedResponse`. Hosts that do their own I/O
//! call those two directly.
//!
//! `Dispatcher` wires them to a `Transport` on a tokio runtime owned by the
//! host. `send_request` spawns the call and returns a `PendingResponse` the
//! caller may await or poll; `dispatch_with` delivers to a callback instead;
//! `execute` runs inline on the caller's task. Every path ends in a
//! `NormalizedResponse`, and debug reports are written on the blocking pool
//! after delivery.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::debug::{DebugReporter, DefaultReporter};
use crate::encode::{build_url, encode_body};
use crate::error::{DispatchError, TransportError};
use crate::headers::resolve_headers;
use crate::http::{HttpMethod, HttpResponse, ResolvedRequest, TransportSettings};
use crate::status::{is_success_status, status_text};
use crate::transport::Transport;
use crate::types::{DebugLevel, NormalizedResponse, RequestOptions, RequestSpec};

/// Resolve URL, headers and body for one request.
pub fn build_request(spec: &RequestSpec) -> ResolvedRequest {
    let url = build_url(&spec.url, &spec.query);
    let encoded = encode_body(
        spec.method,
        &spec.options.content_type,
        &spec.body,
        spec.raw_body.as_deref(),
        spec.options.encode_payload,
    );
    let headers = resolve_headers(
        encoded.content_type.as_deref(),
        &spec.headers,
        &spec.custom_headers,
    );

    debug!(
        method = %spec.method,
        url = %url,
        headers = headers.len(),
        body_len = encoded.body.len(),
        "resolved request"
    );

    ResolvedRequest {
        method: spec.method,
        url,
        headers,
        body: encoded.body,
    }
}

/// Map a transport result onto the caller-facing response.
pub fn normalize_response(
    result: Result<HttpResponse, TransportError>,
    request_url: &str,
    duration: Duration,
) -> NormalizedResponse {
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, url = request_url, "transport failure");
            return NormalizedResponse::transport_failure(err.to_string(), request_url, duration);
        }
    };

    let status_code = i32::from(response.status);
    let content_length = match response.content_length {
        Some(len) => i64::try_from(len).unwrap_or(i64::MAX),
        None => i64::try_from(response.body.len()).unwrap_or(i64::MAX),
    };

    NormalizedResponse {
        success: is_success_status(status_code),
        status_code,
        status_text: status_text(status_code).to_string(),
        data: response.body,
        error_message: String::new(),
        headers: response.headers,
        duration_seconds: duration.as_secs_f64(),
        content_length,
        content_type: response.content_type,
        final_url: response.final_url.unwrap_or_else(|| request_url.to_string()),
    }
}

/// Sends resolved requests through a `Transport` on a host-provided
/// runtime.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    reporter: Arc<dyn DebugReporter>,
    runtime: Handle,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Bind to the tokio runtime the caller is running on.
    pub fn new(transport: impl Transport + 'static) -> Result<Self, DispatchError> {
        let runtime = Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;
        Ok(Self::with_runtime(transport, runtime))
    }

    pub fn with_runtime(transport: impl Transport + 'static, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            reporter: Arc::new(DefaultReporter::default()),
            runtime,
        }
    }

    pub fn with_reporter(mut self, reporter: impl DebugReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Run the request on the caller's task and return its response.
    pub async fn execute(&self, spec: RequestSpec) -> NormalizedResponse {
        let (request, response) = run(self.transport.as_ref(), &spec).await;
        self.report(request, response.clone(), spec.options);
        response
    }

    /// Spawn the request and return immediately. The response arrives on the
    /// returned `PendingResponse`.
    pub fn send_request(&self, spec: RequestSpec) -> PendingResponse {
        let (tx, rx) = oneshot::channel();
        let url = spec.url.clone();
        self.dispatch_with(spec, move |response| {
            if tx.send(response).is_err() {
                debug!("caller stopped listening for the response");
            }
        });
        PendingResponse { receiver: rx, url }
    }

    /// Spawn the request and hand its response to `callback`.
    pub fn dispatch_with<F>(&self, spec: RequestSpec, callback: F)
    where
        F: FnOnce(NormalizedResponse) + Send + 'static,
    {
        let this = self.clone();
        self.runtime.spawn(async move {
            let (request, response) = run(this.transport.as_ref(), &spec).await;
            callback(response.clone());
            this.report(request, response, spec.options);
        });
    }

    /// `GET url` with the default headers.
    pub fn quick_get(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.send_request(RequestSpec::new(HttpMethod::Get, url).options(options))
    }

    /// `POST url` with an already serialized JSON body.
    pub fn quick_post(&self, url: &str, json_body: &str, options: RequestOptions) -> PendingResponse {
        self.send_request(
            RequestSpec::new(HttpMethod::Post, url)
                .raw_body(json_body)
                .options(options),
        )
    }

    fn report(&self, request: ResolvedRequest, response: NormalizedResponse, options: RequestOptions) {
        if options.debug_level == DebugLevel::None {
            return;
        }
        let reporter = Arc::clone(&self.reporter);
        self.runtime.spawn_blocking(move || {
            if let Err(e) = reporter.report(&request, &response, &options) {
                warn!(error = %e, "debug report failed");
            }
        });
    }
}

async fn run(transport: &dyn Transport, spec: &RequestSpec) -> (ResolvedRequest, NormalizedResponse) {
    let request = build_request(spec);
    let settings = TransportSettings::from(&spec.options);

    let started = Instant::now();
    let result = match settings.timeout {
        Some(limit) => tokio::time::timeout(limit, transport.execute(&request, &settings))
            .await
            .unwrap_or(Err(TransportError::Timeout {
                seconds: limit.as_secs(),
            })),
        None => transport.execute(&request, &settings).await,
    };
    let response = normalize_response(result, &request.url, started.elapsed());
    (request, response)
}

/// The receiving end of a dispatched request.
///
/// Await it, or poll with `try_take`. Dropping it stops listening; the
/// request itself still runs to completion.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: oneshot::Receiver<NormalizedResponse>,
    url: String,
}

impl PendingResponse {
    /// The response, if it has arrived.
    pub fn try_take(&mut self) -> Option<NormalizedResponse> {
        match self.receiver.try_recv() {
            Ok(response) => Some(response),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(self.abandoned()),
        }
    }

    fn abandoned(&self) -> NormalizedResponse {
        NormalizedResponse::transport_failure(
            "dispatch task ended without a response",
            &self.url,
            Duration::ZERO,
        )
    }
}

impl Future for PendingResponse {
    type Output = NormalizedResponse;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(response)) => Poll::Ready(response),
            Poll::Ready(Err(_)) => Poll::Ready(this.abandoned()),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ReportError;
    use crate::types::{ContentType, HeaderKey, KeyValue};

    /// Answers every request with a fixed result and remembers what it saw.
    struct StubTransport {
        result: Result<HttpResponse, TransportError>,
        seen: Mutex<Vec<ResolvedRequest>>,
    }

    impl StubTransport {
        fn ok(status: u16, body: &str) -> Self {
            Self {
                result: Ok(HttpResponse {
                    status,
                    headers: vec![KeyValue::new("content-type", "application/json")],
                    body: body.to_string(),
                    content_length: None,
                    content_type: "application/json".to_string(),
                    final_url: None,
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn err(err: TransportError) -> Self {
            Self {
                result: Err(err),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(
            &self,
            request: &ResolvedRequest,
            _settings: &TransportSettings,
        ) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    /// Never completes.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn execute(
            &self,
            _request: &ResolvedRequest,
            _settings: &TransportSettings,
        ) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    struct FailingReporter;

    impl DebugReporter for FailingReporter {
        fn report(
            &self,
            _request: &ResolvedRequest,
            _response: &NormalizedResponse,
            _options: &RequestOptions,
        ) -> Result<(), ReportError> {
            Err(ReportError::Write {
                path: "nowhere".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn build_request_composes_url_headers_and_body() {
        let spec = RequestSpec::new(HttpMethod::Post, "https://api.example.com/users")
            .query("verbose", "yes please")
            .header(HeaderKey::Authorization, "Bearer t")
            .custom_header("X-Request-Id", "r-1")
            .field("name", "Ada");
        let request = build_request(&spec);

        assert_eq!(request.url, "https://api.example.com/users?verbose=yes%20please");
        assert_eq!(request.headers.get("Authorization"), Some("Bearer t"));
        assert_eq!(request.headers.get("X-Request-Id"), Some("r-1"));
        assert_eq!(request.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(request.body, r#"{"name":"Ada"}"#);
    }

    #[test]
    fn post_without_fields_has_empty_body() {
        let request = build_request(&RequestSpec::new(HttpMethod::Post, "http://x"));
        assert_eq!(request.body, "");
    }

    #[test]
    fn get_ignores_body_fields() {
        let spec = RequestSpec::new(HttpMethod::Get, "http://x").field("a", "1");
        assert_eq!(build_request(&spec).body, "");
    }

    #[test]
    fn form_request_gets_form_content_type() {
        let spec = RequestSpec::new(HttpMethod::Put, "http://x")
            .field("a", "1")
            .field("b", "two words")
            .options(RequestOptions {
                content_type: ContentType::FormUrlEncoded,
                ..RequestOptions::default()
            });
        let request = build_request(&spec);
        assert_eq!(request.body, "a=1&b=two%20words");
        assert_eq!(
            request.headers.get("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn get_keeps_default_content_type_whatever_the_option() {
        let spec = RequestSpec::new(HttpMethod::Get, "http://x").options(RequestOptions {
            content_type: ContentType::FormUrlEncoded,
            ..RequestOptions::default()
        });
        let request = build_request(&spec);
        assert_eq!(request.headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn empty_custom_content_type_warns_once_and_keeps_default() {
        let spec = RequestSpec::new(HttpMethod::Post, "http://x")
            .field("payload", "abc")
            .options(RequestOptions {
                content_type: ContentType::Custom(String::new()),
                ..RequestOptions::default()
            });
        let request = build_request(&spec);

        assert_eq!(request.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(request.body, "abc");
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("custom content type is empty")).count() {
                1 => Ok(()),
                n => Err(format!("expected one warning, saw {n}")),
            }
        });
    }

    #[test]
    fn normalize_success() {
        let response = normalize_response(
            Ok(HttpResponse {
                status: 200,
                body: "hello".to_string(),
                ..HttpResponse::default()
            }),
            "http://x",
            Duration::from_millis(1500),
        );
        assert!(response.success);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.data, "hello");
        assert_eq!(response.content_length, 5);
        assert_eq!(response.final_url, "http://x");
        assert!((response.duration_seconds - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_http_failure_keeps_response() {
        let response = normalize_response(
            Ok(HttpResponse {
                status: 404,
                body: r#"{"error":"missing"}"#.to_string(),
                headers: vec![KeyValue::new("x-reason", "gone")],
                content_length: Some(19),
                content_type: "application/json".to_string(),
                final_url: Some("http://x/final".to_string()),
            }),
            "http://x",
            Duration::ZERO,
        );
        assert!(!response.success);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.data, r#"{"error":"missing"}"#);
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.content_length, 19);
        assert_eq!(response.final_url, "http://x/final");
        assert!(response.error_message.is_empty());
    }

    #[test]
    fn normalize_transport_failure() {
        let response = normalize_response(
            Err(TransportError::NoResponse),
            "http://x",
            Duration::from_secs(2),
        );
        assert!(!response.success);
        assert_eq!(response.status_code, -1);
        assert_eq!(response.error_message, "no response");
        assert!(response.data.is_empty());
        assert_eq!(response.duration_seconds, 2.0);
    }

    #[tokio::test]
    async fn send_request_delivers_through_pending_response() {
        let transport = Arc::new(StubTransport::ok(201, r#"{"id":1}"#));
        let dispatcher = Dispatcher::new(Arc::clone(&transport)).unwrap();

        let response = dispatcher
            .send_request(RequestSpec::new(HttpMethod::Post, "http://x/items").field("a", "1"))
            .await;

        assert!(response.success);
        assert_eq!(response.status_code, 201);
        assert_eq!(response.status_text, "Created");
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].body, r#"{"a":"1"}"#);
    }

    #[tokio::test]
    async fn dispatch_with_invokes_callback() {
        let dispatcher = Dispatcher::new(StubTransport::ok(204, "")).unwrap();
        let (tx, rx) = oneshot::channel();
        dispatcher.dispatch_with(RequestSpec::new(HttpMethod::Delete, "http://x/1"), move |r| {
            let _ = tx.send(r);
        });
        let response = rx.await.unwrap();
        assert!(response.success);
        assert_eq!(response.status_text, "No Content");
    }

    #[tokio::test]
    async fn execute_maps_transport_errors() {
        let dispatcher =
            Dispatcher::new(StubTransport::err(TransportError::Connect("refused".to_string()))).unwrap();
        let response = dispatcher
            .execute(RequestSpec::new(HttpMethod::Get, "http://127.0.0.1:1"))
            .await;
        assert!(!response.success);
        assert_eq!(response.status_code, -1);
        assert_eq!(response.error_message, "connection failed: refused");
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_transport_times_out() {
        let dispatcher = Dispatcher::new(HangingTransport).unwrap();
        let spec = RequestSpec::new(HttpMethod::Get, "http://slow").options(RequestOptions {
            timeout_seconds: 2,
            ..RequestOptions::default()
        });
        let response = dispatcher.send_request(spec).await;
        assert!(!response.success);
        assert_eq!(response.status_code, -1);
        assert!(response.error_message.contains("timed out"));
        assert!(response.duration_seconds >= 0.0);
    }

    #[tokio::test]
    async fn pending_response_can_be_polled() {
        let dispatcher = Dispatcher::new(StubTransport::ok(200, "ok")).unwrap();
        let mut pending = dispatcher.quick_get("http://x", RequestOptions::default());
        let response = loop {
            if let Some(response) = pending.try_take() {
                break response;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(response.data, "ok");
    }

    #[tokio::test]
    async fn quick_post_sends_raw_json() {
        let transport = Arc::new(StubTransport::ok(200, "{}"));
        let dispatcher = Dispatcher::new(Arc::clone(&transport)).unwrap();
        dispatcher
            .quick_post("http://x", r#"{"nested":{"a":1}}"#, RequestOptions::default())
            .await;
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].body, r#"{"nested":{"a":1}}"#);
        assert_eq!(seen[0].headers.get("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn reporter_failure_does_not_affect_response() {
        let dispatcher = Dispatcher::new(StubTransport::ok(200, "fine"))
            .unwrap()
            .with_reporter(FailingReporter);
        let spec = RequestSpec::new(HttpMethod::Get, "http://x").options(RequestOptions {
            debug_level: DebugLevel::Verbose,
            ..RequestOptions::default()
        });
        let response = dispatcher.execute(spec).await;
        assert!(response.success);
        assert_eq!(response.data, "fine");
    }

    #[test]
    fn new_outside_runtime_fails() {
        assert!(matches!(
            Dispatcher::new(HangingTransport),
            Err(DispatchError::NoRuntime)
        ));
    }
}
