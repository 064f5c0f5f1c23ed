use atlasmcp_core::atlassian::jira::{
    projects_from_response, transitions_from_response, JiraApi, NewIssue,
};
use atlasmcp_core::config::ServiceConfig;
use atlasmcp_core::Error;
use serde_json::Value;

use super::{AtlassianClient, Deletion};

/// Typed Jira operations over an [`AtlassianClient`].
///
/// Issue keys are percent-encoded before they reach a path segment.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: AtlassianClient,
    api: JiraApi,
}

impl JiraClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, Error> {
        Ok(Self {
            client: AtlassianClient::new(config)?,
            api: JiraApi::new(config.is_cloud()),
        })
    }

    pub async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
        expand: Option<&str>,
    ) -> Result<Value, Error> {
        let request = self.api.get_issue(&segment(issue_key), fields, expand);
        self.client.send(request).await
    }

    pub async fn search_issues(
        &self,
        jql: &str,
        fields: Option<&[String]>,
        start_at: u64,
        max_results: u64,
    ) -> Result<Value, Error> {
        let request = self.api.search_issues(jql, fields, start_at, max_results);
        self.client.send(request).await
    }

    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Value, Error> {
        self.client.send(self.api.create_issue(issue)).await
    }

    pub async fn update_issue(&self, issue_key: &str, fields: Value) -> Result<Value, Error> {
        let request = self.api.update_issue(&segment(issue_key), fields);
        self.client.send(request).await
    }

    pub async fn delete_issue(&self, issue_key: &str) -> Result<Deletion, Error> {
        let request = self.api.delete_issue(&segment(issue_key));
        Deletion::from_response(self.client.send(request).await)
    }

    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<Value, Error> {
        let request = self.api.add_comment(&segment(issue_key), comment);
        self.client.send(request).await
    }

    pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Value>, Error> {
        let request = self.api.get_transitions(&segment(issue_key));
        let response = self.client.send(request).await?;
        Ok(transitions_from_response(&response))
    }

    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        fields: Option<&Value>,
        comment: Option<&str>,
    ) -> Result<Value, Error> {
        let request = self
            .api
            .transition_issue(&segment(issue_key), transition_id, fields, comment);
        self.client.send(request).await
    }

    /// Every project visible to the configured user.
    pub async fn get_projects(&self) -> Result<Vec<Value>, Error> {
        let response = self.client.send(self.api.get_projects()).await?;
        Ok(projects_from_response(response))
    }

    pub async fn get_user(&self, user_identifier: &str) -> Result<Value, Error> {
        self.client.send(self.api.get_user(user_identifier)).await
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
