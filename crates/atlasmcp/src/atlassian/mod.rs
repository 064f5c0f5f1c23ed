//! Authenticated access to the Jira and Confluence REST APIs.

use atlasmcp_core::config::{Service, ServiceConfig};

pub mod client;
pub mod confluence;
pub mod jira;

pub use client::AtlassianClient;

/// Resolve a service configuration from the process environment.
pub fn config_from_env(service: Service) -> ServiceConfig {
    let config = ServiceConfig::from_lookup(service, |key| std::env::var(key).ok());
    log::debug!("Resolved {} configuration: {config:?}", service.name());
    config
}

/// Outcome of a delete call.
///
/// The remote rejecting the delete is an expected answer, not an error.
/// Authentication failures still surface as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Deletion {
    Deleted,
    Rejected(atlasmcp_core::Error),
}

impl Deletion {
    /// Fold a delete round trip into a [`Deletion`].
    pub fn from_response(
        response: Result<serde_json::Value, atlasmcp_core::Error>,
    ) -> Result<Self, atlasmcp_core::Error> {
        match response {
            Ok(_) => Ok(Deletion::Deleted),
            Err(err @ atlasmcp_core::Error::Api { .. }) => Ok(Deletion::Rejected(err)),
            Err(err) => Err(err),
        }
    }
}
