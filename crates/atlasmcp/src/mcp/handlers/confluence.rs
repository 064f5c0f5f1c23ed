use crate::prelude::eprintln;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_arguments, text_result, tool, Context, JsonRpcError, Tool};

fn default_limit() -> u64 {
    25
}

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "confluence_search",
            "Search Confluence content. Plain keywords become a siteSearch query; anything containing a CQL operator is sent as CQL. Returns simplified pages with id, title, type, space and URL.",
            ["confluence", "read"],
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Keywords or CQL (e.g., 'space = DEV AND type = page')"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 25)"
                    },
                    "start": {
                        "type": "integer",
                        "description": "Index of the first result (default: 0)"
                    }
                },
                "required": ["query"]
            }),
        ),
        tool(
            "confluence_get_page",
            "Get a Confluence page and its storage-format content, by id or by title within a space.",
            ["confluence", "read"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id. Takes precedence over title and space_key" },
                    "title": { "type": "string", "description": "Page title, used together with space_key" },
                    "space_key": { "type": "string", "description": "Space key, used together with title" }
                },
                "required": []
            }),
        ),
        tool(
            "confluence_create_page",
            "Create a Confluence page from storage-format (XHTML) content.",
            ["confluence", "write"],
            json!({
                "type": "object",
                "properties": {
                    "space_key": { "type": "string", "description": "Space key (e.g., 'DEV')" },
                    "title": { "type": "string", "description": "Page title" },
                    "content": { "type": "string", "description": "Page body in storage format" },
                    "parent_id": { "type": "string", "description": "Id of the parent page" }
                },
                "required": ["space_key", "title", "content"]
            }),
        ),
        tool(
            "confluence_update_page",
            "Replace the title and content of a Confluence page. The page version is read first and incremented.",
            ["confluence", "write"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" },
                    "title": { "type": "string", "description": "New page title" },
                    "content": { "type": "string", "description": "New page body in storage format" },
                    "parent_id": { "type": "string", "description": "Id of the new parent page" }
                },
                "required": ["page_id", "title", "content"]
            }),
        ),
        tool(
            "confluence_delete_page",
            "Delete a Confluence page.",
            ["confluence", "write"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" }
                },
                "required": ["page_id"]
            }),
        ),
        tool(
            "confluence_add_comment",
            "Add a storage-format comment to a Confluence page.",
            ["confluence", "write"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" },
                    "content": { "type": "string", "description": "Comment body in storage format" }
                },
                "required": ["page_id", "content"]
            }),
        ),
        tool(
            "confluence_get_page_comments",
            "List the comments of a Confluence page.",
            ["confluence", "read"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" }
                },
                "required": ["page_id"]
            }),
        ),
        tool(
            "confluence_get_page_children",
            "List the child pages of a Confluence page.",
            ["confluence", "read"],
            json!({
                "type": "object",
                "properties": {
                    "parent_id": { "type": "string", "description": "Id of the parent page" },
                    "limit": { "type": "integer", "description": "Maximum number of children (default: 25)" },
                    "start": { "type": "integer", "description": "Index of the first child (default: 0)" }
                },
                "required": ["parent_id"]
            }),
        ),
        tool(
            "confluence_get_page_labels",
            "List the labels of a Confluence page.",
            ["confluence", "read"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" }
                },
                "required": ["page_id"]
            }),
        ),
        tool(
            "confluence_add_page_label",
            "Add a global label to a Confluence page and return the page's labels.",
            ["confluence", "write"],
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Page id" },
                    "label_name": { "type": "string", "description": "Label to add" }
                },
                "required": ["page_id", "label_name"]
            }),
        ),
    ]
}

#[derive(Deserialize)]
struct PageIdArgs {
    page_id: String,
}

pub async fn handle_search(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        query: String,
        #[serde(default = "default_limit")]
        limit: u64,
        #[serde(default)]
        start: u64,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling confluence_search: query={}, limit={}, start={}",
            args.query, args.limit, args.start
        );
    }

    let text = context
        .services
        .confluence
        .search(&args.query, args.limit, args.start)
        .await;

    text_result(text)
}

pub async fn handle_get_page(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        page_id: Option<String>,
        title: Option<String>,
        space_key: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling confluence_get_page: page_id={:?}, title={:?}, space_key={:?}",
            args.page_id, args.title, args.space_key
        );
    }

    let text = context
        .services
        .confluence
        .get_page(
            args.page_id.as_deref(),
            args.title.as_deref(),
            args.space_key.as_deref(),
        )
        .await;

    text_result(text)
}

pub async fn handle_create_page(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        space_key: String,
        title: String,
        content: String,
        parent_id: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling confluence_create_page: space_key={}, title={}",
            args.space_key, args.title
        );
    }

    let text = context
        .services
        .confluence
        .create_page(
            &args.space_key,
            &args.title,
            &args.content,
            args.parent_id.as_deref(),
        )
        .await;

    text_result(text)
}

pub async fn handle_update_page(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        page_id: String,
        title: String,
        content: String,
        parent_id: Option<String>,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling confluence_update_page: page_id={}", args.page_id);
    }

    let text = context
        .services
        .confluence
        .update_page(
            &args.page_id,
            &args.title,
            &args.content,
            args.parent_id.as_deref(),
        )
        .await;

    text_result(text)
}

pub async fn handle_delete_page(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    let args: PageIdArgs = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling confluence_delete_page: page_id={}", args.page_id);
    }

    text_result(context.services.confluence.delete_page(&args.page_id).await)
}

pub async fn handle_add_comment(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        page_id: String,
        content: String,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling confluence_add_comment: page_id={}", args.page_id);
    }

    let text = context
        .services
        .confluence
        .add_comment(&args.page_id, &args.content)
        .await;

    text_result(text)
}

pub async fn handle_get_page_comments(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    let args: PageIdArgs = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling confluence_get_page_comments: page_id={}", args.page_id);
    }

    text_result(
        context
            .services
            .confluence
            .get_page_comments(&args.page_id)
            .await,
    )
}

pub async fn handle_get_page_children(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        parent_id: String,
        #[serde(default = "default_limit")]
        limit: u64,
        #[serde(default)]
        start: u64,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling confluence_get_page_children: parent_id={}, limit={}, start={}",
            args.parent_id, args.limit, args.start
        );
    }

    let text = context
        .services
        .confluence
        .get_page_children(&args.parent_id, args.limit, args.start)
        .await;

    text_result(text)
}

pub async fn handle_get_page_labels(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    let args: PageIdArgs = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!("Calling confluence_get_page_labels: page_id={}", args.page_id);
    }

    text_result(
        context
            .services
            .confluence
            .get_page_labels(&args.page_id)
            .await,
    )
}

pub async fn handle_add_page_label(
    arguments: Option<Value>,
    context: &Context,
) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        page_id: String,
        label_name: String,
    }

    let args: Args = parse_arguments(arguments)?;

    if context.global.verbose {
        eprintln!(
            "Calling confluence_add_page_label: page_id={}, label_name={}",
            args.page_id, args.label_name
        );
    }

    let text = context
        .services
        .confluence
        .add_page_label(&args.page_id, &args.label_name)
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context_for(server: &MockServer) -> Context {
        Context {
            global: crate::Global { verbose: false },
            services: Arc::new(Services::new(
                empty_config(Service::Jira),
                basic_config(Service::Confluence, &server.uri()),
            )),
        }
    }

    #[tokio::test]
    async fn test_search_defaults_limit_and_start() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/search"))
            .and(query_param("cql", "siteSearch ~ \"runbook\""))
            .and(query_param("limit", "25"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let result = handle_search(Some(json!({ "query": "runbook" })), &context_for(&server))
            .await
            .unwrap();

        assert_eq!(result["content"][0]["text"], "[]");
    }

    #[tokio::test]
    async fn test_get_page_without_arguments_is_error_envelope() {
        let server = MockServer::start().await;

        let result = handle_get_page(None, &context_for(&server)).await.unwrap();

        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Either 'page_id' OR both 'title' and 'space_key' must be provided"));
    }

    #[tokio::test]
    async fn test_add_page_label_requires_label_name() {
        let server = MockServer::start().await;

        let err = handle_add_page_label(Some(json!({ "page_id": "1" })), &context_for(&server))
            .await
            .unwrap_err();

        assert_eq!(err.code, -32602);
    }
}
