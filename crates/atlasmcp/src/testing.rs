//! Shared fixtures for the shell's tests.

use atlasmcp_core::config::{Service, ServiceConfig};
use wiremock::MockServer;

/// Base URL that points at the mock server and still reads as a Cloud site.
pub fn cloud_url(server: &MockServer) -> String {
    format!("{}/atlassian.net", server.uri())
}

/// Basic-auth configuration for `service` pointed at `base_url`.
pub fn basic_config(service: Service, base_url: &str) -> ServiceConfig {
    ServiceConfig {
        service,
        base_url: base_url.to_string(),
        username: Some("alice@example.com".to_string()),
        password: None,
        api_token: Some("token".to_string()),
        oauth_token: None,
        cloud_id: None,
        filter: Vec::new(),
    }
}

/// Configuration with neither URL nor credentials.
pub fn empty_config(service: Service) -> ServiceConfig {
    ServiceConfig::from_lookup(service, |_| None)
}
