use crate::prelude::eprintln;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_arguments, text_result, tool, Context, JsonRpcError, Tool};

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "jira_get_issue",
            "Get the details of a Jira issue by key. Returns the issue exactly as the Jira REST API reports it.",
            ["jira", "read"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key (e.g., 'PROJ-123')"
                    },
                    "fields": {
                        "type": "string",
                        "description": "Comma separated list of fields to return. '*all' returns every field (default)"
                    },
                    "expand": {
                        "type": "string",
                        "description": "Comma separated list of entities to expand (e.g., 'renderedFields,changelog')"
                    }
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "jira_search_issues",
            "Search Jira issues using JQL (Jira Query Language). Returns the raw search result with issues, total and paging fields.",
            ["jira", "read"],
            json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "JQL query (e.g., 'project = PROJ AND status = Open')"
                    },
                    "fields": {
                        "type": "string",
                        "description": "Comma separated list of fields to return. '*all' returns every field"
                    },
                    "start_at": {
                        "type": "integer",
                        "description": "Index of the first result (default: 0)"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 50)"
                    }
                },
                "required": ["jql"]
            }),
        ),
        tool(
            "jira_create_issue",
            "Create a new Jira issue. The description is sent as an Atlassian Document Format paragraph.",
            ["jira", "write"],
            json!({
                "type": "object",
                "properties": {
                    "project_key": { "type": "string", "description": "Project key (e.g., 'PROJ')" },
                    "summary": { "type": "string", "description": "Issue summary" },
                    "issue_type": { "type": "string", "description": "Issue type name (e.g., 'Task', 'Bug')" },
                    "description": { "type": "string", "description": "Plain text description" },
                    "assignee": {
                        "type": "string",
                        "description": "Account id (Cloud) or username (Server) of the assignee"
                    }
                },
                "required": ["project_key", "summary", "issue_type"]
            }),
        ),
        tool(
            "jira_update_issue",
            "Update fields of an existing Jira issue and return the updated issue.",
            ["jira", "write"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" },
                    "fields": {
                        "type": "object",
                        "description": "Field values to set, keyed by field id (e.g., {\"summary\": \"New title\"})"
                    }
                },
                "required": ["issue_key", "fields"]
            }),
        ),
        tool(
            "jira_delete_issue",
            "Delete a Jira issue.",
            ["jira", "write"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" }
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "jira_add_comment",
            "Add a plain text comment to a Jira issue.",
            ["jira", "write"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" },
                    "comment": { "type": "string", "description": "Comment text" }
                },
                "required": ["issue_key", "comment"]
            }),
        ),
        tool(
            "jira_get_transitions",
            "List the workflow transitions currently available for a Jira issue.",
            ["jira", "read"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" }
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "jira_transition_issue",
            "Move a Jira issue through a workflow transition, optionally setting fields and adding a comment. Returns the updated issue.",
            ["jira", "write"],
            json!({
                "type": "object",
                "properties": {
                    "issue_key": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" },
                    "transition_id": {
                        "type": "string",
                        "description": "Transition id, as reported by jira_get_transitions"
                    },
                    "fields": { "type": "object", "description": "Field values required by the transition screen" },
                    "comment": { "type": "string", "description": "Comment to add with the transition" }
                },
                "required": ["issue_key", "transition_id"]
            }),
        ),
        tool(
            "jira_get_projects",
            "List the Jira projects visible to the configured user.",
            ["jira", "read"],
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        ),
        tool(
            "jira_get_user_profile",
            "Get a Jira user's profile by account id (Cloud) or username (Server).",
            ["jira", "read"],
            json!({
                "type": "object",
                "properties": {
                    "user_identifier": {
                        "type": "string",
                        "description": "Account id (Cloud) or username (Server)"
                    }
                },
                "required": ["user_identifier"]
            }),
        ),
    ]
}

pub async fn handle_get_issue(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        fields: Option<String>,
        expand: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_get_issue: issue_key={}, fields={:?}, expand={:?}",
            args.issue_key, args.fields, args.expand
        );
    }

    let text = context
        .services
        .jira
        .get_issue(&args.issue_key, args.fields.as_deref(), args.expand.as_deref())
        .await;

    text_result(text)
}

pub async fn handle_search_issues(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        jql: String,
        fields: Option<String>,
        #[serde(default)]
        start_at: u64,
        #[serde(default = "default_max_results")]
        max_results: u64,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_search_issues: jql={}, start_at={}, max_results={}",
            args.jql, args.start_at, args.max_results
        );
    }

    let text = context
        .services
        .jira
        .search_issues(
            &args.jql,
            args.fields.as_deref(),
            args.start_at,
            args.max_results,
        )
        .await;

    text_result(text)
}

fn default_max_results() -> u64 {
    50
}

pub async fn handle_create_issue(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        project_key: String,
        summary: String,
        issue_type: String,
        description: Option<String>,
        assignee: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_create_issue: project_key={}, issue_type={}",
            args.project_key, args.issue_type
        );
    }

    let text = context
        .services
        .jira
        .create_issue(
            &args.project_key,
            &args.summary,
            &args.issue_type,
            args.description.as_deref(),
            args.assignee.as_deref(),
        )
        .await;

    text_result(text)
}

pub async fn handle_update_issue(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        fields: serde_json::Map<String, Value>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_update_issue: issue_key={}, fields={:?}",
            args.issue_key,
            args.fields.keys().collect::<Vec<_>>()
        );
    }

    let text = context
        .services
        .jira
        .update_issue(&args.issue_key, Value::Object(args.fields))
        .await;

    text_result(text)
}

#[derive(Deserialize)]
struct IssueKeyArgs {
    issue_key: String,
}

pub async fn handle_delete_issue(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    let args: IssueKeyArgs = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling jira_delete_issue: issue_key={}", args.issue_key);
    }

    text_result(context.services.jira.delete_issue(&args.issue_key).await)
}

pub async fn handle_add_comment(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        comment: String,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling jira_add_comment: issue_key={}", args.issue_key);
    }

    let text = context
        .services
        .jira
        .add_comment(&args.issue_key, &args.comment)
        .await;

    text_result(text)
}

pub async fn handle_get_transitions(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    let args: IssueKeyArgs = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling jira_get_transitions: issue_key={}", args.issue_key);
    }

    text_result(context.services.jira.get_transitions(&args.issue_key).await)
}

pub async fn handle_transition_issue(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        transition_id: String,
        fields: Option<Value>,
        comment: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_transition_issue: issue_key={}, transition_id={}",
            args.issue_key, args.transition_id
        );
    }

    let text = context
        .services
        .jira
        .transition_issue(
            &args.issue_key,
            &args.transition_id,
            args.fields.as_ref(),
            args.comment.as_deref(),
        )
        .await;

    text_result(text)
}

pub async fn handle_get_projects(
    _arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    if context.global.verbose {
        eprintln!("Calling jira_get_projects");
    }

    text_result(context.services.jira.get_projects().await)
}

pub async fn handle_get_user_profile(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        user_identifier: String,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling jira_get_user_profile: user_identifier={}",
            args.user_identifier
        );
    }

    let text = context
        .services
        .jira
        .get_user_profile(&args.user_identifier)
        .await;

    text_result(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{basic_config, empty_config};
    use crate::tools::Services;
    use atlasmcp_core::config::Service;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context_for(server: &MockServer) -> Context {
        Context {
            global: crate::Global { verbose: false },
            services: Arc::new(Services::new(
                basic_config(Service::Jira, &server.uri()),
                empty_config(Service::Confluence),
            )),
        }
    }

    #[tokio::test]
    async fn test_search_issues_applies_argument_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/search"))
            .and(body_partial_json(json!({ "startAt": 0, "maxResults": 50 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "issues": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let result = handle_search_issues(Some(json!({ "jql": "project = ABC" })), &context_for(&server))
            .await
            .unwrap();

        assert!(result.get("isError").is_none());
    }

    #[tokio::test]
    async fn test_update_issue_requires_object_fields() {
        let server = MockServer::start().await;

        let err = handle_update_issue(
            Some(json!({ "issue_key": "ABC-1", "fields": "summary=x" })),
            &context_for(&server),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_delete_issue_rejection_is_flagged() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = handle_delete_issue(Some(json!({ "issue_key": "ABC-1" })), &context_for(&server))
            .await
            .unwrap();

        assert_eq!(result["isError"], true);
    }
}
