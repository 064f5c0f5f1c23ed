use atlasmcp_core::config::{AuthMode, ServiceConfig};
use atlasmcp_core::http::{self, Method, RequestEnvelope};
use atlasmcp_core::Error;
use serde_json::Value;

/// Authenticated session against one Atlassian base URL.
///
/// Headers are fixed when the client is built: `Authorization`, plus JSON
/// `Accept` and `Content-Type`. Every call returns the decoded body or an
/// [`Error`] following the status taxonomy in [`http::classify_status`].
#[derive(Debug, Clone)]
pub struct AtlassianClient {
    http: reqwest::Client,
    base_url: String,
}

impl AtlassianClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, Error> {
        let auth = config.auth_mode()?;
        let http = create_authenticated_client(&auth)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Perform one round trip.
    pub async fn send(&self, request: RequestEnvelope) -> Result<Value, Error> {
        let url = http::join_url(&self.base_url, &request.path);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.http.request(to_reqwest_method(request.method), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", request.method, url, e);
            Error::network(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(Error::network)?;

        http::classify_status(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &url,
            &body,
        )
        .inspect_err(|e| log::warn!("{} {} failed: {}", request.method, url, e))?;

        http::parse_body(&body)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Create an HTTP client with the authentication and JSON headers preset.
fn create_authenticated_client(auth: &AuthMode) -> Result<reqwest::Client, Error> {
    use base64::Engine;
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

    let authorization = match auth {
        AuthMode::Bearer(token) => format!("Bearer {token}"),
        AuthMode::Basic { username, secret } => {
            let auth_string = format!("{username}:{secret}");
            let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);
            format!("Basic {auth_encoded}")
        }
    };

    let mut auth_value = HeaderValue::from_str(&authorization)
        .map_err(|e| Error::Configuration(format!("Invalid header value: {e}")))?;
    auth_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::basic_config;
    use atlasmcp_core::config::Service;
    use atlasmcp_core::ErrorKind;
    use base64::Engine;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_basic_auth_prefers_api_token() {
        // Arrange
        let server = MockServer::start().await;
        let mut config = basic_config(Service::Jira, &server.uri());
        config.password = Some("password".to_string());
        let expected = base64::engine::general_purpose::STANDARD.encode("alice@example.com:token");

        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .and(header("authorization", format!("Basic {expected}").as_str()))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "alice" })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let client = AtlassianClient::new(&config).unwrap();
        let result = client.send(RequestEnvelope::get("rest/api/2/myself")).await.unwrap();

        // Assert
        assert_eq!(result, json!({ "name": "alice" }));
    }

    #[tokio::test]
    async fn test_oauth_token_uses_bearer() {
        let server = MockServer::start().await;
        let mut config = basic_config(Service::Confluence, &server.uri());
        config.oauth_token = Some("oauth-token".to_string());

        Mock::given(method("GET"))
            .and(path("/rest/api/space"))
            .and(header("authorization", "Bearer oauth-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&config).unwrap();
        let result = client.send(RequestEnvelope::get("/rest/api/space")).await.unwrap();

        assert_eq!(result, json!({ "results": [] }));
    }

    #[test]
    fn test_new_without_credentials_is_authentication_error() {
        let mut config = basic_config(Service::Jira, "https://example.atlassian.net");
        config.api_token = None;

        let err = AtlassianClient::new(&config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/search"))
            .and(query_param("cql", "type = page"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Confluence, &server.uri())).unwrap();
        let result = client
            .send(
                RequestEnvelope::get("rest/api/search")
                    .with_query("cql", "type = page")
                    .with_query("limit", 25),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_trailing_slash_on_base_url_is_joined_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = format!("{}/", server.uri());
        let client = AtlassianClient::new(&basic_config(Service::Jira, &base_url)).unwrap();
        let result = client.send(RequestEnvelope::get("/rest/api/2/project")).await.unwrap();

        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "fields": { "summary": "x" } })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "key": "ABC-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let result = client
            .send(
                RequestEnvelope::post("rest/api/2/issue")
                    .with_json(json!({ "fields": { "summary": "x" } })),
            )
            .await
            .unwrap();

        assert_eq!(result["key"], "ABC-1");
    }

    #[tokio::test]
    async fn test_form_body_overrides_json_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/content/1/label"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("name=docs"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Confluence, &server.uri())).unwrap();
        let request = RequestEnvelope::post("rest/api/content/1/label")
            .with_form(vec![("name".to_string(), "docs".to_string())]);

        let result = client.send(request).await.unwrap();

        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/3/issue/ABC-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let result = client
            .send(RequestEnvelope::put("rest/api/3/issue/ABC-1").with_json(json!({ "fields": {} })))
            .await
            .unwrap();

        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn test_401_is_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let err = client.send(RequestEnvelope::get("rest/api/2/myself")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().starts_with("Authentication failed: 401"));
    }

    #[tokio::test]
    async fn test_403_is_access_denied() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let err = client.send(RequestEnvelope::delete("rest/api/2/issue/ABC-1")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().starts_with("Access denied: 403"));
    }

    #[tokio::test]
    async fn test_404_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "errorMessages": ["Issue does not exist"] })),
            )
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let err = client.send(RequestEnvelope::get("rest/api/2/issue/NOPE-1")).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().starts_with("API request failed: 404"));
        match err {
            Error::Api { body, .. } => {
                assert_eq!(body, json!({ "errorMessages": ["Issue does not exist"] }))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_500_with_html_body_has_empty_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let client = AtlassianClient::new(&basic_config(Service::Jira, &server.uri())).unwrap();
        let err = client.send(RequestEnvelope::get("rest/api/2/project")).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        match err {
            Error::Api { body, .. } => assert_eq!(body, json!({})),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        // Nothing listens on port 1.
        let client =
            AtlassianClient::new(&basic_config(Service::Jira, "http://127.0.0.1:1")).unwrap();

        let err = client.send(RequestEnvelope::get("rest/api/2/project")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Network error:"));
    }
}
