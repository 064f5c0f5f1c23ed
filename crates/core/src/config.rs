//! Service configuration resolved from an environment-like key/value source.
//!
//! Resolution never fails: missing keys simply leave fields empty. Whether the
//! result is usable is answered later by [`ServiceConfig::is_auth_configured`]
//! and [`ServiceConfig::auth_mode`].

use crate::error::Error;

pub const USERNAME_KEY: &str = "ATLASSIAN_USERNAME";
pub const PASSWORD_KEY: &str = "ATLASSIAN_PASSWORD";
pub const API_TOKEN_KEY: &str = "ATLASSIAN_API_TOKEN";
pub const CLOUD_ID_KEY: &str = "ATLASSIAN_CLOUD_ID";

/// Substring that marks a Cloud deployment in a base URL.
const CLOUD_HOST_MARKER: &str = "atlassian.net";

/// Remote backend a configuration points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Jira,
    Confluence,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Jira => "Jira",
            Service::Confluence => "Confluence",
        }
    }

    pub fn url_key(&self) -> &'static str {
        match self {
            Service::Jira => "JIRA_URL",
            Service::Confluence => "CONFLUENCE_URL",
        }
    }

    pub fn oauth_token_key(&self) -> &'static str {
        match self {
            Service::Jira => "ATLASSIAN_OAUTH_TOKEN",
            Service::Confluence => "CONFLUENCE_OAUTH_TOKEN",
        }
    }

    pub fn filter_key(&self) -> &'static str {
        match self {
            Service::Jira => "JIRA_PROJECTS_FILTER",
            Service::Confluence => "CONFLUENCE_SPACES_FILTER",
        }
    }
}

/// How a client authenticates its session.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// HTTP Basic with the API token (preferred) or the password as secret.
    Basic { username: String, secret: String },
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Bearer(_) => f.write_str("Bearer(***)"),
            AuthMode::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("secret", &"***")
                .finish(),
        }
    }
}

/// Connection settings for one backend.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    pub service: Service,
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
    pub oauth_token: Option<String>,
    pub cloud_id: Option<String>,
    /// `JIRA_PROJECTS_FILTER` / `CONFLUENCE_SPACES_FILTER` keys. Informational only.
    pub filter: Vec<String>,
}

impl ServiceConfig {
    /// Resolve a configuration from any key/value source.
    ///
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(service: Service, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            service,
            base_url: get(service.url_key()).unwrap_or_default(),
            username: get(USERNAME_KEY),
            password: get(PASSWORD_KEY),
            api_token: get(API_TOKEN_KEY),
            oauth_token: get(service.oauth_token_key()),
            cloud_id: get(CLOUD_ID_KEY),
            filter: get(service.filter_key())
                .map(|raw| parse_filter(&raw))
                .unwrap_or_default(),
        }
    }

    /// True when the URL is set and either an OAuth token or a username with
    /// a password or API token is available.
    pub fn is_auth_configured(&self) -> bool {
        !self.base_url.is_empty() && self.auth_mode().is_ok()
    }

    pub fn is_cloud(&self) -> bool {
        self.base_url.contains(CLOUD_HOST_MARKER)
    }

    /// Select the authentication mode: OAuth token first, then Basic.
    pub fn auth_mode(&self) -> Result<AuthMode, Error> {
        if let Some(token) = &self.oauth_token {
            return Ok(AuthMode::Bearer(token.clone()));
        }

        match (&self.username, self.api_token.as_ref().or(self.password.as_ref())) {
            (Some(username), Some(secret)) => Ok(AuthMode::Basic {
                username: username.clone(),
                secret: secret.clone(),
            }),
            _ => Err(Error::Authentication(
                "No valid authentication method configured".to_string(),
            )),
        }
    }

    /// Error returned by the tools when the configuration is not usable.
    pub fn not_configured_error(&self) -> Error {
        Error::Authentication(format!(
            "{} authentication not configured. Please set {} and authentication credentials.",
            self.service.name(),
            self.service.url_key()
        ))
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");

        f.debug_struct("ServiceConfig")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_token", &redact(&self.api_token))
            .field("oauth_token", &redact(&self.oauth_token))
            .field("cloud_id", &self.cloud_id)
            .field("filter", &self.filter)
            .finish()
    }
}

/// Split a comma separated list of keys, dropping blanks.
pub fn parse_filter(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_missing_keys_yield_empty_config() {
        let config = ServiceConfig::from_lookup(Service::Jira, lookup_from(&[]));

        assert_eq!(config.base_url, "");
        assert_eq!(config.username, None);
        assert_eq!(config.oauth_token, None);
        assert!(config.filter.is_empty());
        assert!(!config.is_auth_configured());
        assert!(!config.is_cloud());
    }

    #[test]
    fn test_from_lookup_reads_service_specific_keys() {
        let lookup = lookup_from(&[
            ("JIRA_URL", "https://jira.example.com"),
            ("CONFLUENCE_URL", "https://wiki.example.com"),
            ("ATLASSIAN_OAUTH_TOKEN", "jira-oauth"),
            ("CONFLUENCE_OAUTH_TOKEN", "wiki-oauth"),
            ("JIRA_PROJECTS_FILTER", "PROJ, OPS ,,"),
            ("CONFLUENCE_SPACES_FILTER", "DEV"),
            ("ATLASSIAN_CLOUD_ID", "cloud-123"),
        ]);

        let jira = ServiceConfig::from_lookup(Service::Jira, &lookup);
        let confluence = ServiceConfig::from_lookup(Service::Confluence, &lookup);

        assert_eq!(jira.base_url, "https://jira.example.com");
        assert_eq!(jira.oauth_token.as_deref(), Some("jira-oauth"));
        assert_eq!(jira.filter, vec!["PROJ", "OPS"]);
        assert_eq!(jira.cloud_id.as_deref(), Some("cloud-123"));

        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.oauth_token.as_deref(), Some("wiki-oauth"));
        assert_eq!(confluence.filter, vec!["DEV"]);
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[
                ("JIRA_URL", "https://jira.example.com"),
                ("ATLASSIAN_USERNAME", "alice"),
                ("ATLASSIAN_API_TOKEN", ""),
            ]),
        );

        assert_eq!(config.api_token, None);
        assert!(!config.is_auth_configured());
    }

    #[test]
    fn test_is_cloud_is_a_substring_check() {
        let cloud = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[("JIRA_URL", "https://acme.atlassian.net")]),
        );
        let server = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[("JIRA_URL", "https://jira.acme.internal")]),
        );

        assert!(cloud.is_cloud());
        assert!(!server.is_cloud());
    }

    #[test]
    fn test_auth_mode_prefers_oauth_token() {
        let config = ServiceConfig::from_lookup(
            Service::Confluence,
            lookup_from(&[
                ("CONFLUENCE_URL", "https://wiki.example.com"),
                ("CONFLUENCE_OAUTH_TOKEN", "oauth"),
                ("ATLASSIAN_USERNAME", "alice"),
                ("ATLASSIAN_PASSWORD", "hunter2"),
            ]),
        );

        assert_eq!(config.auth_mode(), Ok(AuthMode::Bearer("oauth".to_string())));
        assert!(config.is_auth_configured());
    }

    #[test]
    fn test_auth_mode_prefers_token_over_password() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[
                ("JIRA_URL", "https://jira.example.com"),
                ("ATLASSIAN_USERNAME", "alice"),
                ("ATLASSIAN_PASSWORD", "hunter2"),
                ("ATLASSIAN_API_TOKEN", "token"),
            ]),
        );

        assert_eq!(
            config.auth_mode(),
            Ok(AuthMode::Basic {
                username: "alice".to_string(),
                secret: "token".to_string(),
            })
        );
    }

    #[test]
    fn test_auth_mode_falls_back_to_password() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[
                ("JIRA_URL", "https://jira.example.com"),
                ("ATLASSIAN_USERNAME", "alice"),
                ("ATLASSIAN_PASSWORD", "hunter2"),
            ]),
        );

        assert_eq!(
            config.auth_mode(),
            Ok(AuthMode::Basic {
                username: "alice".to_string(),
                secret: "hunter2".to_string(),
            })
        );
    }

    #[test]
    fn test_auth_mode_without_username_is_rejected() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[
                ("JIRA_URL", "https://jira.example.com"),
                ("ATLASSIAN_API_TOKEN", "token"),
            ]),
        );

        let err = config.auth_mode().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Authentication);
        assert!(!config.is_auth_configured());
    }

    #[test]
    fn test_credentials_without_url_are_not_configured() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[("ATLASSIAN_OAUTH_TOKEN", "oauth")]),
        );

        assert!(config.auth_mode().is_ok());
        assert!(!config.is_auth_configured());
    }

    #[test]
    fn test_not_configured_error_mentions_authentication() {
        let config = ServiceConfig::from_lookup(Service::Confluence, lookup_from(&[]));
        let message = config.not_configured_error().to_string();

        assert!(message.contains("authentication"));
        assert!(message.contains("CONFLUENCE_URL"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ServiceConfig::from_lookup(
            Service::Jira,
            lookup_from(&[
                ("ATLASSIAN_USERNAME", "alice"),
                ("ATLASSIAN_API_TOKEN", "super-secret"),
            ]),
        );

        let rendered = format!("{config:?} {:?}", config.auth_mode());
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("super-secret"));
    }
}
