//! Header resolution: merging default, content-type, enum-selected and
//! free-form headers into one ordered mapping.
//!
//! Precedence, lowest first:
//! 1. `DEFAULT_JSON_HEADERS`
//! 2. the `Content-Type` the body encoder derived from
//!    `RequestOptions::content_type` (body-carrying methods only)
//! 3. `HeaderEntry` values selected from the well-known table
//! 4. free-form custom headers
//!
//! A later source replaces an earlier value under the same canonical name
//! and keeps that name's original position. Names from the well-known table
//! match case-insensitively; any other name matches exactly.

use tracing::{debug, warn};

use crate::types::{ContentType, HeaderEntry, HeaderKey, KeyValue};

/// Headers every request starts from.
pub const DEFAULT_JSON_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

const CANONICAL_NAMES: &[&str] = &[
    "Authorization",
    "Content-Type",
    "Accept",
    "User-Agent",
    "Accept-Language",
    "Accept-Encoding",
    "Cache-Control",
    "Connection",
    "Cookie",
    "Host",
    "Origin",
    "Referer",
    "X-Requested-With",
    "X-API-Key",
    "X-Auth-Token",
    "X-CSRF-Token",
];

/// Map a header name onto its canonical spelling when it is one of the
/// well-known names; other names are returned unchanged.
pub fn canonical_name(name: &str) -> &str {
    CANONICAL_NAMES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(name))
        .copied()
        .unwrap_or(name)
}

/// The default JSON headers as owned pairs.
pub fn default_json_headers() -> Vec<KeyValue> {
    DEFAULT_JSON_HEADERS
        .iter()
        .map(|(k, v)| KeyValue::new(*k, *v))
        .collect()
}

/// Insertion-ordered header mapping with unique canonical names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map pre-filled with `DEFAULT_JSON_HEADERS`.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for (name, value) in DEFAULT_JSON_HEADERS {
            map.insert(name, *value);
        }
        map
    }

    /// Insert or replace a header. Returns the previous value, if any.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let name = canonical_name(name);
        let value = value.into();
        if let Some(slot) = self.entries.iter().position(|(k, _)| k == name) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.entries.push((name.to_string(), value));
        None
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = canonical_name(name);
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_pairs(&self) -> Vec<KeyValue> {
        self.iter().map(|(k, v)| KeyValue::new(k, v)).collect()
    }
}

impl From<HeaderMap> for Vec<(String, String)> {
    fn from(map: HeaderMap) -> Self {
        map.entries
    }
}

/// Merge every header source for one request.
///
/// `content_type` is the value the body encoder derived. `None` (GET and
/// DELETE, or an empty custom type) leaves the default in place.
pub fn resolve_headers(
    content_type: Option<&str>,
    entries: &[HeaderEntry],
    custom: &[KeyValue],
) -> HeaderMap {
    let mut headers = HeaderMap::with_defaults();

    if let Some(mime) = content_type {
        headers.insert("Content-Type", mime);
    }

    for entry in entries {
        match entry.key.name() {
            Some(name) => {
                if let Some(previous) = headers.insert(name, entry.value.as_str()) {
                    debug!(header = name, %previous, "header overridden");
                }
            }
            None => warn!("dropping custom header with an empty name"),
        }
    }

    for pair in custom {
        if pair.key.is_empty() {
            warn!("dropping header with an empty name");
            continue;
        }
        if let Some(previous) = headers.insert(&pair.key, pair.value.as_str()) {
            debug!(header = %pair.key, %previous, "header overridden");
        }
    }

    headers
}

/// Build a header entry, from the well-known table or a custom name.
pub fn make_header(key: HeaderKey, value: impl Into<String>) -> HeaderEntry {
    HeaderEntry::new(key, value)
}

/// `Authorization: Bearer <token>`.
pub fn make_bearer_token(token: &str) -> HeaderEntry {
    HeaderEntry::new(HeaderKey::Authorization, format!("Bearer {token}"))
}

/// `X-API-Key: <key>`.
pub fn make_api_key(key: &str) -> HeaderEntry {
    HeaderEntry::new(HeaderKey::XApiKey, key)
}

/// A `Content-Type` entry for the given content type. An empty custom value
/// yields an entry with an empty custom name, which resolution drops.
pub fn make_content_type_header(content_type: &ContentType) -> HeaderEntry {
    match content_type.mime() {
        Some(mime) => HeaderEntry::new(HeaderKey::ContentType, mime),
        None => HeaderEntry::new(HeaderKey::Custom(String::new()), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_yield_defaults() {
        let headers = resolve_headers(None, &[], &[]);
        assert_eq!(
            headers.to_pairs(),
            vec![
                KeyValue::new("Content-Type", "application/json"),
                KeyValue::new("Accept", "application/json"),
            ]
        );
    }

    #[test]
    fn encoded_content_type_overrides_default() {
        let headers = resolve_headers(Some("application/x-www-form-urlencoded"), &[], &[]);
        assert_eq!(headers.get("Content-Type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn missing_content_type_keeps_default() {
        let headers = resolve_headers(None, &[], &[]);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn custom_headers_beat_enum_headers_beat_content_type() {
        let entries = vec![
            HeaderEntry::new(HeaderKey::ContentType, "text/csv"),
            HeaderEntry::new(HeaderKey::Accept, "text/html"),
        ];
        let custom = vec![KeyValue::new("accept", "application/xml")];
        let headers = resolve_headers(Some("text/plain"), &entries, &custom);

        assert_eq!(headers.get("Content-Type"), Some("text/csv"));
        assert_eq!(headers.get("Accept"), Some("application/xml"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn override_keeps_original_position_and_unrelated_headers() {
        let entries = vec![
            make_bearer_token("abc"),
            HeaderEntry::new(HeaderKey::ContentType, "text/plain"),
        ];
        let headers = resolve_headers(None, &entries, &[]);
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Content-Type", "Accept", "Authorization"]);
        assert_eq!(headers.get("Authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn custom_enum_entry_without_name_is_dropped() {
        let entries = vec![
            HeaderEntry::new(HeaderKey::Custom(String::new()), "lost"),
            HeaderEntry::new(HeaderKey::Custom("X-Trace-Id".to_string()), "t-1"),
        ];
        let headers = resolve_headers(None, &entries, &[]);
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("X-Trace-Id"), Some("t-1"));
        assert!(headers.iter().all(|(_, v)| v != "lost"));
    }

    #[test]
    fn well_known_names_are_canonicalized() {
        let custom = vec![
            KeyValue::new("user-agent", "courier/0.1"),
            KeyValue::new("x-api-key", "k"),
        ];
        let headers = resolve_headers(None, &[], &custom);
        assert_eq!(headers.get("User-Agent"), Some("courier/0.1"));
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert!(names.contains(&"X-API-Key"));
    }

    #[test]
    fn unknown_names_match_case_sensitively() {
        let custom = vec![KeyValue::new("X-Foo", "1"), KeyValue::new("x-foo", "2")];
        let headers = resolve_headers(None, &[], &custom);
        assert_eq!(headers.get("X-Foo"), Some("1"));
        assert_eq!(headers.get("x-foo"), Some("2"));
    }

    #[test]
    fn later_custom_header_wins() {
        let custom = vec![
            KeyValue::new("Cookie", "a=1"),
            KeyValue::new("Cookie", "b=2"),
        ];
        let headers = resolve_headers(None, &[], &custom);
        assert_eq!(headers.get("cookie"), Some("b=2"));
    }

    #[test]
    fn helpers_build_expected_entries() {
        assert_eq!(make_api_key("secret"), HeaderEntry::new(HeaderKey::XApiKey, "secret"));
        assert_eq!(
            make_content_type_header(&ContentType::TextXml),
            HeaderEntry::new(HeaderKey::ContentType, "text/xml")
        );
        assert_eq!(make_content_type_header(&ContentType::Custom(String::new())).key.name(), None);
        assert_eq!(default_json_headers().len(), 2);
    }
}
