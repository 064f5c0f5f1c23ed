use atlasmcp_core::atlassian::confluence::{
    build_cql, comment_output, current_version, page_detail, page_revision,
    transform_children, transform_comments, transform_search_results, NewPage, PageUpdate,
};
use atlasmcp_core::config::ServiceConfig;
use atlasmcp_core::envelope::{render, Envelope};
use atlasmcp_core::Error;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::non_empty;
use crate::atlassian::confluence::ConfluenceClient;
use crate::atlassian::Deletion;

/// How `get_page` resolved its selector.
enum PageLookup {
    Found(Value),
    TitleNotFound,
    NoSelector,
}

/// Confluence operations rendered as JSON envelopes.
#[derive(Debug)]
pub struct ConfluenceTools {
    config: ServiceConfig,
    client: OnceCell<ConfluenceClient>,
}

impl ConfluenceTools {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&ConfluenceClient, Error> {
        self.client
            .get_or_try_init(|| async {
                if !self.config.is_auth_configured() {
                    return Err(self.config.not_configured_error());
                }
                ConfluenceClient::new(&self.config)
            })
            .await
    }

    /// CQL actually sent for a tool query. Raw CQL goes out untouched.
    pub fn search_cql(&self, query: &str) -> String {
        build_cql(query)
    }

    // ========================================================================
    // Search and Read
    // ========================================================================

    pub async fn search(&self, query: &str, limit: u64, start: u64) -> String {
        let result = async {
            let client = self.client().await?;
            client.search(&self.search_cql(query), limit, start).await
        };

        match result.await {
            Ok(response) => render(&transform_search_results(&response)),
            Err(e) => {
                log::error!("Error searching Confluence with query '{query}': {e}");
                Envelope::error(format!("Failed to search Confluence: {e}"))
                    .with("query", query)
                    .render()
            }
        }
    }

    /// Fetch a page by id, or by title within a space.
    pub async fn get_page(
        &self,
        page_id: Option<&str>,
        title: Option<&str>,
        space_key: Option<&str>,
    ) -> String {
        let title = non_empty(title);
        let space_key = non_empty(space_key);

        let result = async {
            let client = self.client().await?;

            match (non_empty(page_id), title, space_key) {
                (Some(page_id), _, _) => client.get_page(page_id, None).await.map(PageLookup::Found),
                (None, Some(title), Some(space_key)) => client
                    .get_page_by_title(space_key, title)
                    .await
                    .map(|page| page.map_or(PageLookup::TitleNotFound, PageLookup::Found)),
                _ => Ok(PageLookup::NoSelector),
            }
        };

        match result.await {
            Ok(PageLookup::Found(page)) => Envelope::new()
                .with_serialized("metadata", &page_detail(&page))
                .render(),
            Ok(PageLookup::TitleNotFound) => Envelope::error(format!(
                "Page with title '{}' not found in space '{}'",
                title.unwrap_or_default(),
                space_key.unwrap_or_default()
            ))
            .render(),
            Ok(PageLookup::NoSelector) => {
                Envelope::error("Either 'page_id' OR both 'title' and 'space_key' must be provided")
                    .render()
            }
            Err(e) => {
                log::error!("Error getting Confluence page: {e}");
                Envelope::error(format!("Failed to get page: {e}")).render()
            }
        }
    }

    pub async fn get_page_children(&self, parent_id: &str, limit: u64, start: u64) -> String {
        let result = async {
            let client = self.client().await?;
            client.get_page_children(parent_id, limit, start, None).await
        };

        match result.await {
            Ok(children) => render(&transform_children(parent_id, &children)),
            Err(e) => {
                log::error!("Error getting children for Confluence page {parent_id}: {e}");
                Envelope::error(format!("Failed to get child pages: {e}"))
                    .with("parent_id", parent_id)
                    .render()
            }
        }
    }

    pub async fn get_page_comments(&self, page_id: &str) -> String {
        let result = async { self.client().await?.get_page_comments(page_id).await };

        match result.await {
            Ok(comments) => render(&transform_comments(page_id, &comments)),
            Err(e) => {
                log::error!("Error getting comments for Confluence page {page_id}: {e}");
                Envelope::error(format!("Failed to get comments: {e}"))
                    .with("page_id", page_id)
                    .render()
            }
        }
    }

    // ========================================================================
    // Write
    // ========================================================================

    pub async fn create_page(
        &self,
        space_key: &str,
        title: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> String {
        let page = NewPage {
            space_key: space_key.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            parent_id: non_empty(parent_id).map(str::to_string),
        };

        let result = async { self.client().await?.create_page(&page).await };

        match result.await {
            Ok(created) => Envelope::message("Page created successfully")
                .with_serialized("page", &page_revision(&created))
                .render(),
            Err(e) => {
                log::error!("Error creating Confluence page: {e}");
                Envelope::error(format!("Failed to create page: {e}"))
                    .with("space_key", space_key)
                    .with("title", title)
                    .render()
            }
        }
    }

    /// Read the current version, then write the next one. Concurrent edits
    /// between the two calls surface as an API error.
    pub async fn update_page(
        &self,
        page_id: &str,
        title: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> String {
        let result = async {
            let client = self.client().await?;
            let current = client.get_page(page_id, None).await?;

            let update = PageUpdate {
                page_id: page_id.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                current_version: current_version(&current),
                parent_id: non_empty(parent_id).map(str::to_string),
            };
            client.update_page(&update).await
        };

        match result.await {
            Ok(updated) => Envelope::message("Page updated successfully")
                .with_serialized("page", &page_revision(&updated))
                .render(),
            Err(e) => {
                log::error!("Error updating Confluence page {page_id}: {e}");
                Envelope::error(format!("Failed to update page {page_id}: {e}"))
                    .with("page_id", page_id)
                    .render()
            }
        }
    }

    pub async fn delete_page(&self, page_id: &str) -> String {
        let result = async { self.client().await?.delete_page(page_id).await };

        match result.await {
            Ok(Deletion::Deleted) => Envelope::new()
                .with("success", true)
                .with("message", format!("Page {page_id} deleted successfully"))
                .render(),
            Ok(Deletion::Rejected(reason)) => {
                log::warn!("Delete of Confluence page {page_id} was rejected: {reason}");
                Envelope::new()
                    .with("success", false)
                    .with("message", format!("Unable to delete page {page_id}"))
                    .render()
            }
            Err(e) => {
                log::error!("Error deleting Confluence page {page_id}: {e}");
                Envelope::new()
                    .with("success", false)
                    .with("error", e.to_string())
                    .with("page_id", page_id)
                    .render()
            }
        }
    }

    pub async fn add_comment(&self, page_id: &str, content: &str) -> String {
        let result = async { self.client().await?.add_comment(page_id, content).await };

        match result.await {
            Ok(created) => Envelope::new()
                .with("success", true)
                .with("message", "Comment added successfully")
                .with_serialized("comment", &comment_output(&created))
                .render(),
            Err(e) => {
                log::error!("Error adding comment to Confluence page {page_id}: {e}");
                Envelope::new()
                    .with("success", false)
                    .with("error", e.to_string())
                    .with("page_id", page_id)
                    .render()
            }
        }
    }

    // ========================================================================
    // Labels
    // ========================================================================

    pub async fn get_page_labels(&self, page_id: &str) -> String {
        let result = async { self.client().await?.get_page_labels(page_id).await };

        match result.await {
            Ok(labels) => render(&labels),
            Err(e) => {
                log::error!("Error getting labels for Confluence page {page_id}: {e}");
                Envelope::error(format!("Failed to get labels: {e}"))
                    .with("page_id", page_id)
                    .render()
            }
        }
    }

    pub async fn add_page_label(&self, page_id: &str, label_name: &str) -> String {
        let result = async {
            let client = self.client().await?;
            client.add_page_label(page_id, label_name).await
        };

        match result.await {
            Ok(labels) => render(&labels),
            Err(e) => {
                log::error!("Error adding label to Confluence page {page_id}: {e}");
                Envelope::error(format!("Failed to add label: {e}"))
                    .with("page_id", page_id)
                    .with("label_name", label_name)
                    .render()
            }
        }
    }
}
