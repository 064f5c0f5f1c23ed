//! Pure halves of the authenticated request pipeline
//!
//! The shell owns the HTTP session; everything that can be decided without
//! touching the network lives here: how a request is described, how URLs are
//! joined, how a status code maps onto the error taxonomy and how a response
//! body is decoded.

use serde_json::{Map, Value};

use crate::error::Error;

// ============================================================================
// Request Envelope
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a single request relative to the service base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: Method,
    /// Endpoint path, e.g. `rest/api/2/issue/PROJ-1`.
    pub path: String,
    /// Query parameters, already rendered to strings. Order is irrelevant.
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
    pub form: Option<Vec<(String, String)>>,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            json: None,
            form: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn with_optional_query(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
        self.form = Some(form);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// URL Handling
// ============================================================================

/// Join a base URL and an endpoint with exactly one `/` between them.
///
/// One trailing slash is trimmed from the base and one leading slash from the
/// endpoint.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{base}/{endpoint}")
}

// ============================================================================
// Response Handling
// ============================================================================

/// Map an HTTP status onto the error taxonomy.
///
/// Returns `Ok(())` for 2xx responses. `body` is the raw response body, used
/// as best-effort error detail for non-authentication failures.
pub fn classify_status(status: u16, reason: &str, url: &str, body: &[u8]) -> Result<(), Error> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let detail = format!("{status} {reason} for url: {url}");

    match status {
        401 => Err(Error::Authentication(format!(
            "Authentication failed: {detail}"
        ))),
        403 => Err(Error::Authentication(format!("Access denied: {detail}"))),
        _ => {
            let error_body = serde_json::from_slice::<Value>(body)
                .unwrap_or_else(|_| Value::Object(Map::new()));
            Err(Error::api(
                format!("API request failed: {detail}"),
                status,
                error_body,
            ))
        }
    }
}

/// Decode a successful response body. An empty body decodes to `{}`.
pub fn parse_body(body: &[u8]) -> Result<Value, Error> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| Error::Api {
        message: format!("Invalid JSON response: {e}"),
        status: None,
        body: Value::Object(Map::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_join_url_is_stable_under_slash_variation() {
        let a = join_url("https://x.atlassian.net/", "/rest/api/3/issue/ABC-1");
        let b = join_url("https://x.atlassian.net", "rest/api/3/issue/ABC-1");
        let c = join_url("https://x.atlassian.net/", "rest/api/3/issue/ABC-1");
        let d = join_url("https://x.atlassian.net", "/rest/api/3/issue/ABC-1");

        assert_eq!(a, "https://x.atlassian.net/rest/api/3/issue/ABC-1");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn test_join_url_keeps_base_path() {
        assert_eq!(
            join_url("https://example.com/wiki/", "/rest/api/content"),
            "https://example.com/wiki/rest/api/content"
        );
    }

    #[test]
    fn test_classify_status_success() {
        assert!(classify_status(200, "OK", "u", b"").is_ok());
        assert!(classify_status(204, "No Content", "u", b"").is_ok());
    }

    #[test]
    fn test_classify_status_401_is_authentication() {
        let err = classify_status(401, "Unauthorized", "https://x/rest", b"").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().starts_with("Authentication failed:"));
    }

    #[test]
    fn test_classify_status_403_is_access_denied() {
        let err = classify_status(403, "Forbidden", "https://x/rest", b"{}").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().starts_with("Access denied:"));
    }

    #[test]
    fn test_classify_status_404_carries_status_and_body() {
        let body = br#"{"errorMessages":["Issue does not exist"]}"#;
        let err = classify_status(404, "Not Found", "https://x/rest", body).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), Some(404));
        match err {
            Error::Api { body, .. } => {
                assert_eq!(body, json!({ "errorMessages": ["Issue does not exist"] }))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_status_500_with_unparseable_body() {
        let err = classify_status(500, "Internal Server Error", "u", b"<html>oops</html>")
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        match err {
            Error::Api { body, .. } => assert_eq!(body, json!({})),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_body_empty_is_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_body_array() {
        assert_eq!(
            parse_body(br#"[{"key":"PROJ"}]"#).unwrap(),
            json!([{ "key": "PROJ" }])
        );
    }

    #[test]
    fn test_parse_body_invalid_json_is_api_error_without_status() {
        let err = parse_body(b"not json").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Invalid JSON response:"));
        assert!(!err.to_string().contains("Network error"));
    }

    #[test]
    fn test_request_envelope_builder() {
        let request = RequestEnvelope::get("rest/api/search")
            .with_query("cql", "type = page")
            .with_query("limit", 25)
            .with_optional_query("expand", None::<&str>);

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query_value("cql"), Some("type = page"));
        assert_eq!(request.query_value("limit"), Some("25"));
        assert_eq!(request.query_value("expand"), None);
        assert!(request.json.is_none());
    }
}
