mod confluence;
mod jira;

use atlasmcp_core::envelope::is_error_envelope;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{Context, JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "atlasmcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let mut tools = jira::tools();
    tools.extend(confluence::tools());

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    context: &Context,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    log::debug!("tools/call {}", params.name);

    let args = params.arguments;
    match params.name.as_str() {
        "jira_get_issue" => jira::handle_get_issue(args, context).await,
        "jira_search_issues" => jira::handle_search_issues(args, context).await,
        "jira_create_issue" => jira::handle_create_issue(args, context).await,
        "jira_update_issue" => jira::handle_update_issue(args, context).await,
        "jira_delete_issue" => jira::handle_delete_issue(args, context).await,
        "jira_add_comment" => jira::handle_add_comment(args, context).await,
        "jira_get_transitions" => jira::handle_get_transitions(args, context).await,
        "jira_transition_issue" => jira::handle_transition_issue(args, context).await,
        "jira_get_projects" => jira::handle_get_projects(args, context).await,
        "jira_get_user_profile" => jira::handle_get_user_profile(args, context).await,
        "confluence_search" => confluence::handle_search(args, context).await,
        "confluence_get_page" => confluence::handle_get_page(args, context).await,
        "confluence_create_page" => confluence::handle_create_page(args, context).await,
        "confluence_update_page" => confluence::handle_update_page(args, context).await,
        "confluence_delete_page" => confluence::handle_delete_page(args, context).await,
        "confluence_add_comment" => confluence::handle_add_comment(args, context).await,
        "confluence_get_page_comments" => {
            confluence::handle_get_page_comments(args, context).await
        }
        "confluence_get_page_children" => {
            confluence::handle_get_page_children(args, context).await
        }
        "confluence_get_page_labels" => confluence::handle_get_page_labels(args, context).await,
        "confluence_add_page_label" => confluence::handle_add_page_label(args, context).await,
        _ => Err(JsonRpcError::invalid_params(format!(
            "Unknown tool: {}",
            params.name
        ))),
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn tool(name: &str, description: &str, tags: [&str; 2], input_schema: serde_json::Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        input_schema,
    }
}

/// Deserialize tool arguments. Missing arguments are treated as `{}`.
fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    let arguments = arguments.unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))
}

/// Wrap an envelope as MCP text content, flagging error envelopes.
fn text_result(text: String) -> Result<serde_json::Value, JsonRpcError> {
    let is_error = is_error_envelope(&text).then_some(true);

    let result = CallToolResult {
        content: vec![Content::Text { text }],
        is_error,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}
