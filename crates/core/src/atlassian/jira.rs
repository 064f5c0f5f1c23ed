//! Request builders and projections for the Jira REST API
//!
//! Cloud deployments speak `rest/api/3` and address users by account id;
//! Server / Data Center deployments speak `rest/api/2` and address users by
//! name. [`JiraApi`] captures that choice once and every builder follows it.

use serde_json::{json, Map, Value};

use crate::http::RequestEnvelope;

pub const CLOUD_API_BASE: &str = "rest/api/3";
pub const SERVER_API_BASE: &str = "rest/api/2";

/// `fields` value meaning "do not filter".
pub const ALL_FIELDS: &str = "*all";

// ============================================================================
// Rich Text
// ============================================================================

/// Wrap plain text in a single-paragraph ADF (Atlassian Document Format) document.
///
/// Emitted for descriptions and comments on both Cloud and Server.
pub fn adf_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [
                    {
                        "type": "text",
                        "text": text
                    }
                ]
            }
        ]
    })
}

/// Render an ADF document (or a plain string) to readable text.
pub fn render_adf(value: &Value) -> Option<String> {
    if let Value::String(s) = value {
        return Some(s.clone());
    }

    let mut output = String::new();
    for node in value.get("content").and_then(Value::as_array).into_iter().flatten() {
        render_adf_node(node, 0, &mut output);
    }

    let trimmed = output.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn render_adf_node(node: &Value, depth: usize, out: &mut String) {
    let children = node.get("content").and_then(Value::as_array);

    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("hardBreak") => out.push('\n'),
        Some("paragraph") | Some("heading") => {
            for child in children.into_iter().flatten() {
                render_adf_node(child, depth, out);
            }
            out.push('\n');
        }
        Some("bulletList") | Some("orderedList") => {
            for item in children.into_iter().flatten() {
                render_adf_node(item, depth + 1, out);
            }
        }
        Some("listItem") => {
            out.push_str(&"  ".repeat(depth.saturating_sub(1)));
            out.push_str("• ");
            for child in children.into_iter().flatten() {
                render_adf_node(child, depth, out);
            }
        }
        _ => {
            for child in children.into_iter().flatten() {
                render_adf_node(child, depth, out);
            }
        }
    }
}

// ============================================================================
// Request Builders
// ============================================================================

/// Fields accepted by [`JiraApi::create_issue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
}

/// Endpoint and payload construction for one Jira deployment variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JiraApi {
    is_cloud: bool,
}

impl JiraApi {
    pub fn new(is_cloud: bool) -> Self {
        Self { is_cloud }
    }

    /// API version segment used for every endpoint.
    pub fn base(&self) -> &'static str {
        if self.is_cloud {
            CLOUD_API_BASE
        } else {
            SERVER_API_BASE
        }
    }

    fn issue_path(&self, issue_key: &str) -> String {
        format!("{}/issue/{}", self.base(), issue_key)
    }

    pub fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
        expand: Option<&str>,
    ) -> RequestEnvelope {
        RequestEnvelope::get(self.issue_path(issue_key))
            .with_optional_query("fields", fields.filter(|f| !f.is_empty()).map(|f| f.join(",")))
            .with_optional_query("expand", expand.filter(|e| !e.is_empty()))
    }

    pub fn search_issues(
        &self,
        jql: &str,
        fields: Option<&[String]>,
        start_at: u64,
        max_results: u64,
    ) -> RequestEnvelope {
        let mut body = json!({
            "jql": jql,
            "startAt": start_at,
            "maxResults": max_results
        });

        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            body["fields"] = json!(fields);
        }

        RequestEnvelope::post(format!("{}/search", self.base())).with_json(body)
    }

    pub fn create_issue(&self, issue: &NewIssue) -> RequestEnvelope {
        let mut fields = json!({
            "project": { "key": issue.project_key },
            "summary": issue.summary,
            "issuetype": { "name": issue.issue_type }
        });

        if let Some(description) = &issue.description {
            fields["description"] = adf_document(description);
        }

        if let Some(assignee) = &issue.assignee {
            fields["assignee"] = if self.is_cloud {
                json!({ "id": assignee })
            } else {
                json!({ "name": assignee })
            };
        }

        RequestEnvelope::post(format!("{}/issue", self.base())).with_json(json!({ "fields": fields }))
    }

    pub fn update_issue(&self, issue_key: &str, fields: Value) -> RequestEnvelope {
        RequestEnvelope::put(self.issue_path(issue_key)).with_json(json!({ "fields": fields }))
    }

    pub fn delete_issue(&self, issue_key: &str) -> RequestEnvelope {
        RequestEnvelope::delete(self.issue_path(issue_key))
    }

    pub fn add_comment(&self, issue_key: &str, comment: &str) -> RequestEnvelope {
        RequestEnvelope::post(format!("{}/comment", self.issue_path(issue_key)))
            .with_json(json!({ "body": adf_document(comment) }))
    }

    pub fn get_transitions(&self, issue_key: &str) -> RequestEnvelope {
        RequestEnvelope::get(format!("{}/transitions", self.issue_path(issue_key)))
    }

    /// Execute a transition. Empty field maps and empty comments are omitted.
    pub fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        fields: Option<&Value>,
        comment: Option<&str>,
    ) -> RequestEnvelope {
        let mut body = json!({
            "transition": { "id": transition_id }
        });

        if let Some(fields) = fields.filter(|f| !is_empty_value(f)) {
            body["fields"] = fields.clone();
        }

        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            body["update"] = json!({
                "comment": [
                    { "add": { "body": adf_document(comment) } }
                ]
            });
        }

        RequestEnvelope::post(format!("{}/transitions", self.issue_path(issue_key))).with_json(body)
    }

    pub fn get_projects(&self) -> RequestEnvelope {
        RequestEnvelope::get(format!("{}/project", self.base()))
    }

    /// Look a user up by account id (Cloud) or username (Server).
    pub fn get_user(&self, user_id: &str) -> RequestEnvelope {
        let key = if self.is_cloud { "accountId" } else { "username" };
        RequestEnvelope::get(format!("{}/user", self.base())).with_query(key, user_id)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Projections
// ============================================================================

/// Parse a comma separated `fields` argument. `*all` and blanks mean no filter.
pub fn parse_field_list(fields: Option<&str>) -> Option<Vec<String>> {
    let fields = fields?.trim();
    if fields.is_empty() || fields == ALL_FIELDS {
        return None;
    }

    let list: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

/// Extract the `transitions` array from a transitions response.
pub fn transitions_from_response(response: &Value) -> Vec<Value> {
    response
        .get("transitions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// The project list endpoint returns an array; anything else degrades to empty.
pub fn projects_from_response(response: Value) -> Vec<Value> {
    match response {
        Value::Array(projects) => projects,
        _ => Vec::new(),
    }
}

/// Short human-readable view of an issue, used by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueSummary {
    pub key: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub description: Option<String>,
}

pub fn summarize_issue(issue: &Value) -> IssueSummary {
    let fields = issue.get("fields").cloned().unwrap_or(Value::Object(Map::new()));
    let name_of = |field: &str, attr: &str| {
        fields
            .get(field)
            .and_then(|f| f.get(attr))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    IssueSummary {
        key: issue
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        summary: fields
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string),
        status: name_of("status", "name"),
        issue_type: name_of("issuetype", "name"),
        assignee: name_of("assignee", "displayName"),
        description: fields.get("description").and_then(render_adf),
    }
}

// ============================================================================
// Tests
// ============================================================================
