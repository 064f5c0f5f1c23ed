//! Request builders and projections for the Confluence REST API
//!
//! This module contains zero I/O operations and is fully testable with fixture data.

use serde::Serialize;
use serde_json::{json, Value};

use crate::http::RequestEnvelope;

pub const API_BASE: &str = "rest/api";

pub const SEARCH_EXPAND: &str = "version,space,body.storage";
pub const PAGE_EXPAND: &str = "body.storage,version,space";
pub const CHILDREN_EXPAND: &str = "version,space";
pub const COMMENTS_EXPAND: &str = "body.storage,version";

/// Tokens that mark a query as raw CQL rather than a keyword search.
const CQL_MARKERS: [&str; 6] = ["=", "~", ">", "<", " AND ", " OR "];

// ============================================================================
// Query Helpers
// ============================================================================

/// Turn a tool query into CQL.
///
/// A bare keyword query becomes `siteSearch ~ "<query>"`; anything containing a
/// CQL operator is passed through verbatim.
pub fn build_cql(query: &str) -> String {
    if !query.is_empty() && !CQL_MARKERS.iter().any(|marker| query.contains(marker)) {
        format!("siteSearch ~ \"{query}\"")
    } else {
        query.to_string()
    }
}

/// Confluence storage-format body wrapper.
pub fn storage_body(content: &str) -> Value {
    json!({
        "storage": {
            "value": content,
            "representation": "storage"
        }
    })
}

// ============================================================================
// Request Builders
// ============================================================================

/// Input for [`ConfluenceApi::create_page`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPage {
    pub space_key: String,
    pub title: String,
    pub content: String,
    pub parent_id: Option<String>,
}

/// Input for [`ConfluenceApi::update_page`].
///
/// `current_version` is the version the caller last read; the request asks
/// for `current_version + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageUpdate {
    pub page_id: String,
    pub title: String,
    pub content: String,
    pub current_version: u64,
    pub parent_id: Option<String>,
}

/// Endpoint and payload construction for Confluence. There is no Cloud /
/// Server split at the path level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfluenceApi;

impl ConfluenceApi {
    fn content_path(&self, page_id: &str) -> String {
        format!("{API_BASE}/content/{page_id}")
    }

    pub fn search_content(&self, cql: &str, limit: u64, start: u64) -> RequestEnvelope {
        RequestEnvelope::get(format!("{API_BASE}/search"))
            .with_query("cql", cql)
            .with_query("limit", limit)
            .with_query("start", start)
            .with_query("expand", SEARCH_EXPAND)
    }

    pub fn get_page(&self, page_id: &str, expand: Option<&str>) -> RequestEnvelope {
        RequestEnvelope::get(self.content_path(page_id)).with_query(
            "expand",
            expand.filter(|e| !e.is_empty()).unwrap_or(PAGE_EXPAND),
        )
    }

    pub fn get_page_by_title(&self, space_key: &str, title: &str) -> RequestEnvelope {
        RequestEnvelope::get(format!("{API_BASE}/content"))
            .with_query("spaceKey", space_key)
            .with_query("title", title)
            .with_query("expand", PAGE_EXPAND)
    }

    pub fn get_page_children(
        &self,
        page_id: &str,
        limit: u64,
        start: u64,
        expand: Option<&str>,
    ) -> RequestEnvelope {
        RequestEnvelope::get(format!("{}/child/page", self.content_path(page_id)))
            .with_query("limit", limit)
            .with_query("start", start)
            .with_query(
                "expand",
                expand.filter(|e| !e.is_empty()).unwrap_or(CHILDREN_EXPAND),
            )
    }

    pub fn create_page(&self, page: &NewPage) -> RequestEnvelope {
        let mut body = json!({
            "type": "page",
            "title": page.title,
            "space": { "key": page.space_key },
            "body": storage_body(&page.content)
        });

        if let Some(parent_id) = page.parent_id.as_deref().filter(|p| !p.is_empty()) {
            body["ancestors"] = json!([{ "id": parent_id }]);
        }

        RequestEnvelope::post(format!("{API_BASE}/content")).with_json(body)
    }

    pub fn update_page(&self, update: &PageUpdate) -> RequestEnvelope {
        let mut body = json!({
            "id": update.page_id,
            "type": "page",
            "title": update.title,
            "body": storage_body(&update.content),
            "version": { "number": update.current_version + 1 }
        });

        if let Some(parent_id) = update.parent_id.as_deref().filter(|p| !p.is_empty()) {
            body["ancestors"] = json!([{ "id": parent_id }]);
        }

        RequestEnvelope::put(self.content_path(&update.page_id)).with_json(body)
    }

    pub fn delete_page(&self, page_id: &str) -> RequestEnvelope {
        RequestEnvelope::delete(self.content_path(page_id))
    }

    pub fn get_page_comments(&self, page_id: &str) -> RequestEnvelope {
        RequestEnvelope::get(format!("{}/child/comment", self.content_path(page_id)))
            .with_query("expand", COMMENTS_EXPAND)
    }

    pub fn add_comment(&self, page_id: &str, content: &str) -> RequestEnvelope {
        RequestEnvelope::post(format!("{API_BASE}/content")).with_json(json!({
            "type": "comment",
            "container": { "id": page_id },
            "body": storage_body(content)
        }))
    }

    pub fn get_page_labels(&self, page_id: &str) -> RequestEnvelope {
        RequestEnvelope::get(format!("{}/label", self.content_path(page_id)))
    }

    pub fn add_page_label(&self, page_id: &str, label_name: &str) -> RequestEnvelope {
        RequestEnvelope::post(format!("{}/label", self.content_path(page_id)))
            .with_json(json!([{ "prefix": "global", "name": label_name }]))
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// Simplified page used by search and child listings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PageSummary {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<String>,
    pub space: Option<String>,
    #[serde(rename = "spaceKey")]
    pub space_key: Option<String>,
    pub url: Option<String>,
}

/// Page metadata including its storage-format content.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PageDetail {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<String>,
    pub space: Option<String>,
    #[serde(rename = "spaceKey")]
    pub space_key: Option<String>,
    pub content: String,
    pub version: Option<u64>,
    pub url: Option<String>,
}

/// Page returned by create and update.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PageRevision {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<String>,
    pub space: Option<String>,
    #[serde(rename = "spaceKey")]
    pub space_key: Option<String>,
    pub version: Option<u64>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentOutput {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub comment_type: Option<String>,
    pub content: String,
    pub version: Option<u64>,
}

/// Output for child page listings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChildrenOutput {
    pub parent_id: String,
    pub count: usize,
    pub results: Vec<PageSummary>,
}

/// Output for comment listings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentsOutput {
    pub page_id: String,
    pub count: usize,
    pub results: Vec<CommentOutput>,
}

// ============================================================================
// Pure Transformation Functions
// ============================================================================

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for segment in path {
        current = current.get(*segment)?;
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn version_of(value: &Value) -> Option<u64> {
    value
        .get("version")
        .and_then(|v| v.get("number"))
        .and_then(Value::as_u64)
}

fn storage_value(value: &Value) -> String {
    text_at(value, &["body", "storage", "value"]).unwrap_or_default()
}

/// The `results` array of a list response, or empty.
pub fn results_of(response: &Value) -> Vec<Value> {
    response
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Version number of a page, defaulting to 0 when absent.
pub fn current_version(page: &Value) -> u64 {
    version_of(page).unwrap_or(0)
}

pub fn summarize_page(page: &Value) -> PageSummary {
    PageSummary {
        id: text_at(page, &["id"]),
        title: text_at(page, &["title"]),
        page_type: text_at(page, &["type"]),
        space: text_at(page, &["space", "name"]),
        space_key: text_at(page, &["space", "key"]),
        url: text_at(page, &["_links", "webui"]),
    }
}

pub fn page_detail(page: &Value) -> PageDetail {
    PageDetail {
        id: text_at(page, &["id"]),
        title: text_at(page, &["title"]),
        page_type: text_at(page, &["type"]),
        space: text_at(page, &["space", "name"]),
        space_key: text_at(page, &["space", "key"]),
        content: storage_value(page),
        version: version_of(page),
        url: text_at(page, &["_links", "webui"]),
    }
}

pub fn page_revision(page: &Value) -> PageRevision {
    PageRevision {
        id: text_at(page, &["id"]),
        title: text_at(page, &["title"]),
        page_type: text_at(page, &["type"]),
        space: text_at(page, &["space", "name"]),
        space_key: text_at(page, &["space", "key"]),
        version: version_of(page),
        url: text_at(page, &["_links", "webui"]),
    }
}

pub fn comment_output(comment: &Value) -> CommentOutput {
    CommentOutput {
        id: text_at(comment, &["id"]),
        comment_type: text_at(comment, &["type"]),
        content: storage_value(comment),
        version: version_of(comment),
    }
}

/// Convert a search response into simplified pages.
pub fn transform_search_results(response: &Value) -> Vec<PageSummary> {
    results_of(response).iter().map(summarize_page).collect()
}

pub fn transform_children(parent_id: &str, children: &[Value]) -> ChildrenOutput {
    let results: Vec<PageSummary> = children.iter().map(summarize_page).collect();
    ChildrenOutput {
        parent_id: parent_id.to_string(),
        count: results.len(),
        results,
    }
}

pub fn transform_comments(page_id: &str, comments: &[Value]) -> CommentsOutput {
    let results: Vec<CommentOutput> = comments.iter().map(comment_output).collect();
    CommentsOutput {
        page_id: page_id.to_string(),
        count: results.len(),
        results,
    }
}

// ============================================================================
// Tests
// ============================================================================
