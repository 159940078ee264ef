//! Network collaborator contract
//!
//! The uniqueness check is the only validator that needs the network. It
//! talks to the host through the [`Transport`] trait: a request goes in, a
//! status and body come out. Building the request URL for the mounted
//! validation endpoint also lives here.

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Header marking a request as programmatic
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Failure of the network collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request could not be sent or no response was read
    #[error("request failed: {0}")]
    Connection(String),

    /// Response arrived with a non-2xx status
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// No response within the configured timeout
    #[error("no response within {0}s")]
    Timeout(u64),
}

/// An idempotent GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// GET request for `url` flagged as programmatic
    pub fn get(url: impl Into<String>, requested_with: &str) -> Self {
        Self {
            url: url.into(),
            headers: vec![(REQUESTED_WITH_HEADER.to_string(), requested_with.to_string())],
        }
    }

    /// Header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response status and raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in 200..=299
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Host-provided network access
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request
    async fn get(&self, request: &Request) -> Result<Response, TransportError>;
}

/// Transport answering canned responses per URL
///
/// Unknown URLs fail with [`TransportError::Connection`]. Every request is
/// recorded so callers can inspect what was sent.
#[derive(Debug, Default)]
pub struct StaticTransport {
    responses: RwLock<HashMap<String, Result<Response, TransportError>>>,
    requests: RwLock<Vec<Request>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `response`
    pub fn respond(&self, url: impl Into<String>, response: Result<Response, TransportError>) {
        self.responses.write().insert(url.into(), response);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.requests.read().clone()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, request: &Request) -> Result<Response, TransportError> {
        self.requests.write().push(request.clone());
        debug!("Static transport answering {}", request.url);
        self.responses
            .read()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Connection(format!("no route to {}", request.url))))
    }
}

fn bracketed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(\w+)\]").expect("static pattern"))
}

fn trailing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(\w+)\]$").expect("static pattern"))
}

fn leading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\w+").expect("static pattern"))
}

/// Attribute name from a composite field name
///
/// `user[email]` gives `email`; names without a trailing bracket give an
/// empty string.
pub fn attribute_from_name(name: &str) -> String {
    trailing_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Model class from a composite field name
///
/// With one bracketed segment the leading word is used as is
/// (`user[email]` gives `user`). With nested segments the first bracketed
/// segment is camelized (`user[home_address][city]` gives `HomeAddress`).
pub fn class_from_name(name: &str) -> String {
    let segments: Vec<&str> = bracketed_pattern()
        .captures_iter(name)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    match segments.len() {
        0 => String::new(),
        1 => leading_pattern()
            .find(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        _ => camelize(segments[0]),
    }
}

fn camel_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]|_[a-z]").expect("static pattern"))
}

/// Upper-case a leading lowercase letter and each `_x` pair, dropping the
/// underscore; other underscores are kept
fn camelize(word: &str) -> String {
    camel_pattern()
        .replace_all(word, |caps: &regex::Captures| caps[0].trim_start_matches('_').to_uppercase())
        .into_owned()
}

/// URL of the remote uniqueness check for field `name` holding `value`
pub fn uniqueness_url(engine_path: &str, name: &str, value: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("class", &class_from_name(name))
        .append_pair("attribute", &attribute_from_name(name))
        .append_pair("value", value)
        .append_pair("kind", "uniqueness")
        .finish();
    format!("{}/validate?{}", engine_path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_from_name() {
        assert_eq!(attribute_from_name("user[email]"), "email");
        assert_eq!(attribute_from_name("user[address][city]"), "city");
        assert_eq!(attribute_from_name("email"), "");
    }

    #[test]
    fn test_class_from_name() {
        assert_eq!(class_from_name("user[email]"), "user");
        assert_eq!(class_from_name("user[home_address][city]"), "HomeAddress");
        assert_eq!(class_from_name("email"), "");
    }

    #[test]
    fn test_camelize_only_rewrites_lowercase_after_underscore() {
        assert_eq!(camelize("home_address"), "HomeAddress");
        assert_eq!(camelize("home_2nd"), "Home_2nd");
        assert_eq!(camelize("_private"), "Private");
        assert_eq!(camelize("Already_Upper"), "Already_Upper");
        assert_eq!(class_from_name("user[home_2nd][city]"), "Home_2nd");
    }

    #[test]
    fn test_uniqueness_url_encodes_query() {
        let url = uniqueness_url("/judge", "user[username]", "joe bloggs&co");
        assert_eq!(
            url,
            "/judge/validate?class=user&attribute=username&value=joe+bloggs%26co&kind=uniqueness"
        );
    }

    #[test]
    fn test_request_carries_programmatic_marker() {
        let request = Request::get("/judge/validate", "XMLHttpRequest");
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(Response::new(200, "[]").is_success());
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(302, "").is_success());
        assert!(!Response::new(500, "").is_success());
    }

    #[tokio::test]
    async fn test_static_transport() {
        let transport = StaticTransport::new();
        transport.respond("/ok", Ok(Response::new(200, "[]")));

        let ok = transport.get(&Request::get("/ok", "XMLHttpRequest")).await;
        assert_eq!(ok, Ok(Response::new(200, "[]")));

        let missing = transport.get(&Request::get("/missing", "XMLHttpRequest")).await;
        assert!(matches!(missing, Err(TransportError::Connection(_))));
        assert_eq!(transport.requests().len(), 2);
    }
}
