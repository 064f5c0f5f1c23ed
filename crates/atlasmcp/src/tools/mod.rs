//! Tool-facing operations.
//!
//! Every public method returns a rendered JSON envelope and never an error.
//! The domain client behind each backend is built on first use and reused
//! afterwards.

use atlasmcp_core::config::{Service, ServiceConfig};

pub mod confluence;
pub mod jira;

pub use confluence::ConfluenceTools;
pub use jira::JiraTools;

/// The two tool sets a process serves, built once at start-up.
#[derive(Debug)]
pub struct Services {
    pub jira: JiraTools,
    pub confluence: ConfluenceTools,
}

impl Services {
    pub fn new(jira: ServiceConfig, confluence: ServiceConfig) -> Self {
        Self {
            jira: JiraTools::new(jira),
            confluence: ConfluenceTools::new(confluence),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            crate::atlassian::config_from_env(Service::Jira),
            crate::atlassian::config_from_env(Service::Confluence),
        )
    }
}

/// Treat empty optional arguments the same as missing ones.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
