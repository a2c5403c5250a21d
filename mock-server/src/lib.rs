use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the server saw, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased header names; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Document served by `/json`.
pub fn sample_document() -> Value {
    json!({
        "data": {
            "user": {
                "email": "ada@example.com",
                "age": 36,
                "admin": true,
                "roles": ["author", "editor"],
                "address": {"city": "London"}
            },
            "items": [{"id": 1}, {"id": 2}]
        },
        "ok": true
    })
}

/// Body served by `/bytes`; not valid UTF-8.
pub const BINARY_BODY: [u8; 4] = [0xff, 0xfe, 0x00, 0x80];

/// Value of the `x-note` header on `/bytes`; UTF-8 outside ASCII.
pub const NOTE_HEADER: &str = "café";

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{millis}", any(delay))
        .route("/redirect", any(redirect))
        .route("/json", get(document))
        .route("/bytes", get(binary))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = value.to_str().unwrap_or_default();
        seen.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body,
    };
    tracing::debug!(method = %echo.method, path = %echo.path, "echo");
    ([("x-mock", "echo")], Json(echo)).into_response()
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({ "status": code }))).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn delay(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(json!({ "delayed_ms": millis }))
}

async fn redirect() -> Redirect {
    Redirect::temporary("/echo")
}

async fn document() -> Json<Value> {
    Json(sample_document())
}

async fn binary() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(note) = HeaderValue::from_bytes(NOTE_HEADER.as_bytes()) {
        headers.insert("x-note", note);
    }
    (headers, BINARY_BODY.to_vec()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: Some("a=1".to_string()),
            headers: BTreeMap::from([("accept".to_string(), "application/json".to_string())]),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "a=1");
        assert_eq!(json["headers"]["accept"], "application/json");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            path: "/echo".to_string(),
            query: None,
            headers: BTreeMap::new(),
            body: r#"{"a":"1"}"#.to_string(),
        };
        let text = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&text).unwrap();
        assert_eq!(back.body, echo.body);
        assert!(back.query.is_none());
    }

    #[test]
    fn sample_document_has_nested_user() {
        let doc = sample_document();
        assert_eq!(doc["data"]["user"]["email"], "ada@example.com");
        assert!(doc["data"]["items"].is_array());
    }

    #[test]
    fn binary_body_is_not_utf8() {
        assert!(std::str::from_utf8(&BINARY_BODY).is_err());
        assert!(!NOTE_HEADER.is_ascii());
    }
}
