use atlasmcp_core::atlassian::jira::{parse_field_list, NewIssue};
use atlasmcp_core::config::ServiceConfig;
use atlasmcp_core::envelope::{render, Envelope};
use atlasmcp_core::Error;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::non_empty;
use crate::atlassian::jira::JiraClient;
use crate::atlassian::Deletion;

/// Jira operations rendered as JSON envelopes.
#[derive(Debug)]
pub struct JiraTools {
    config: ServiceConfig,
    client: OnceCell<JiraClient>,
}

impl JiraTools {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&JiraClient, Error> {
        self.client
            .get_or_try_init(|| async {
                if !self.config.is_auth_configured() {
                    return Err(self.config.not_configured_error());
                }
                JiraClient::new(&self.config)
            })
            .await
    }

    // ========================================================================
    // Issues
    // ========================================================================

    pub async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&str>,
        expand: Option<&str>,
    ) -> String {
        let result = async {
            let client = self.client().await?;
            let field_list = parse_field_list(fields);
            client
                .get_issue(issue_key, field_list.as_deref(), non_empty(expand))
                .await
        };

        match result.await {
            Ok(issue) => render(&issue),
            Err(e) => {
                log::error!("Error getting issue {issue_key}: {e}");
                Envelope::error(format!("Failed to get issue {issue_key}: {e}"))
                    .with("issue_key", issue_key)
                    .render()
            }
        }
    }

    pub async fn search_issues(
        &self,
        jql: &str,
        fields: Option<&str>,
        start_at: u64,
        max_results: u64,
    ) -> String {
        let result = async {
            let client = self.client().await?;
            let field_list = parse_field_list(fields);
            client
                .search_issues(jql, field_list.as_deref(), start_at, max_results)
                .await
        };

        match result.await {
            Ok(found) => render(&found),
            Err(e) => {
                log::error!("Error searching issues with JQL '{jql}': {e}");
                Envelope::error(format!("Failed to search issues: {e}"))
                    .with("jql", jql)
                    .render()
            }
        }
    }

    pub async fn create_issue(
        &self,
        project_key: &str,
        summary: &str,
        issue_type: &str,
        description: Option<&str>,
        assignee: Option<&str>,
    ) -> String {
        let issue = NewIssue {
            project_key: project_key.to_string(),
            summary: summary.to_string(),
            issue_type: issue_type.to_string(),
            description: non_empty(description).map(str::to_string),
            assignee: non_empty(assignee).map(str::to_string),
        };

        let result = async { self.client().await?.create_issue(&issue).await };

        match result.await {
            Ok(created) => Envelope::message("Issue created successfully")
                .with("issue", created)
                .render(),
            Err(e) => {
                log::error!("Error creating issue: {e}");
                Envelope::error(format!("Failed to create issue: {e}"))
                    .with("project_key", project_key)
                    .with("summary", summary)
                    .render()
            }
        }
    }

    /// Update the given fields, then return the re-fetched issue.
    pub async fn update_issue(&self, issue_key: &str, fields: Value) -> String {
        let result = async {
            let client = self.client().await?;
            client.update_issue(issue_key, fields).await?;
            client.get_issue(issue_key, None, None).await
        };

        match result.await {
            Ok(updated) => Envelope::message("Issue updated successfully")
                .with("issue", updated)
                .render(),
            Err(e) => {
                log::error!("Error updating issue {issue_key}: {e}");
                Envelope::error(format!("Failed to update issue {issue_key}: {e}"))
                    .with("issue_key", issue_key)
                    .render()
            }
        }
    }

    pub async fn delete_issue(&self, issue_key: &str) -> String {
        let result = async { self.client().await?.delete_issue(issue_key).await };

        match result.await {
            Ok(Deletion::Deleted) => {
                Envelope::message(format!("Issue {issue_key} has been deleted successfully."))
                    .render()
            }
            Ok(Deletion::Rejected(reason)) => {
                log::warn!("Delete of issue {issue_key} was rejected: {reason}");
                Envelope::error(format!(
                    "Failed to delete issue {issue_key}. Issue may not exist or you may not have permission."
                ))
                .render()
            }
            Err(e) => {
                log::error!("Error deleting issue {issue_key}: {e}");
                Envelope::error(format!("Failed to delete issue {issue_key}: {e}"))
                    .with("issue_key", issue_key)
                    .render()
            }
        }
    }

    // ========================================================================
    // Comments and Workflow
    // ========================================================================

    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> String {
        let result = async { self.client().await?.add_comment(issue_key, comment).await };

        match result.await {
            Ok(created) => Envelope::message("Comment added successfully")
                .with("comment", created)
                .render(),
            Err(e) => {
                log::error!("Error adding comment to issue {issue_key}: {e}");
                Envelope::error(format!("Failed to add comment to issue {issue_key}: {e}"))
                    .with("issue_key", issue_key)
                    .render()
            }
        }
    }

    pub async fn get_transitions(&self, issue_key: &str) -> String {
        let result = async { self.client().await?.get_transitions(issue_key).await };

        match result.await {
            Ok(transitions) => render(&transitions),
            Err(e) => {
                log::error!("Error getting transitions for issue {issue_key}: {e}");
                Envelope::error(format!(
                    "Failed to get transitions for issue {issue_key}: {e}"
                ))
                .with("issue_key", issue_key)
                .render()
            }
        }
    }

    /// Execute a transition, then return the re-fetched issue.
    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        fields: Option<&Value>,
        comment: Option<&str>,
    ) -> String {
        let result = async {
            let client = self.client().await?;
            client
                .transition_issue(issue_key, transition_id, fields, comment)
                .await?;
            client.get_issue(issue_key, None, None).await
        };

        match result.await {
            Ok(updated) => {
                Envelope::message(format!("Issue {issue_key} transitioned successfully"))
                    .with("issue", updated)
                    .render()
            }
            Err(e) => {
                log::error!("Error transitioning issue {issue_key}: {e}");
                Envelope::error(format!("Failed to transition issue {issue_key}: {e}"))
                    .with("issue_key", issue_key)
                    .with("transition_id", transition_id)
                    .render()
            }
        }
    }

    // ========================================================================
    // Projects and Users
    // ========================================================================

    pub async fn get_projects(&self) -> String {
        let result = async { self.client().await?.get_projects().await };

        match result.await {
            Ok(projects) => render(&projects),
            Err(e) => {
                log::error!("Error getting projects: {e}");
                Envelope::error(format!("Failed to get projects: {e}")).render()
            }
        }
    }

    pub async fn get_user_profile(&self, user_identifier: &str) -> String {
        let result = async { self.client().await?.get_user(user_identifier).await };

        match result.await {
            Ok(user) => Envelope::new()
                .with("success", true)
                .with("user", user)
                .render(),
            Err(e) => {
                log::error!("Error getting user profile for '{user_identifier}': {e}");
                Envelope::new()
                    .with("success", false)
                    .with("error", e.to_string())
                    .with("user_identifier", user_identifier)
                    .render()
            }
        }
    }
}
