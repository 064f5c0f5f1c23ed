//! Error taxonomy shared by the request client, the domain clients and the tools.

use serde::Serialize;

/// Errors raised below the tool boundary.
///
/// The display text is what ends up inside tool error envelopes, so every
/// variant renders its message verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Credentials are missing, or the server rejected them (401/403).
    #[error("{0}")]
    Authentication(String),

    /// Any other failed round trip. `status` is `None` for transport failures.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
        body: serde_json::Value,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Discriminant of [`Error`], for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Api,
    Configuration,
}

impl Error {
    /// Build an API error carrying the HTTP status and the parsed error body.
    pub fn api(message: impl Into<String>, status: u16, body: serde_json::Value) -> Self {
        Error::Api {
            message: message.into(),
            status: Some(status),
            body,
        }
    }

    /// Build an API error for a failure that never produced an HTTP status.
    pub fn network(message: impl std::fmt::Display) -> Self {
        Error::Api {
            message: format!("Network error: {message}"),
            status: None,
            body: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Api { .. } => ErrorKind::Api,
            Error::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_has_no_status() {
        let err = Error::network("connection refused");

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_api_error_keeps_status_and_body() {
        let body = serde_json::json!({ "errorMessages": ["Issue does not exist"] });
        let err = Error::api("API request failed: 404 Not Found", 404, body.clone());

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), Some(404));
        match err {
            Error::Api { body: actual, .. } => assert_eq!(actual, body),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_authentication_error_displays_message_verbatim() {
        let err = Error::Authentication("Access denied: 403 Forbidden".to_string());

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.to_string(), "Access denied: 403 Forbidden");
        assert_eq!(err.status(), None);
    }
}
