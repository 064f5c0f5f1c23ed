use atlasmcp_core::atlassian::confluence::{results_of, ConfluenceApi, NewPage, PageUpdate};
use atlasmcp_core::config::ServiceConfig;
use atlasmcp_core::Error;
use serde_json::Value;

use super::{AtlassianClient, Deletion};

/// Typed Confluence operations over an [`AtlassianClient`].
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    client: AtlassianClient,
    api: ConfluenceApi,
}

impl ConfluenceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, Error> {
        Ok(Self {
            client: AtlassianClient::new(config)?,
            api: ConfluenceApi,
        })
    }

    /// Run a CQL search. Returns the raw response.
    pub async fn search(&self, cql: &str, limit: u64, start: u64) -> Result<Value, Error> {
        let request = self.api.search_content(cql, limit, start);
        self.client.send(request).await
    }

    pub async fn get_page(&self, page_id: &str, expand: Option<&str>) -> Result<Value, Error> {
        let request = self.api.get_page(page_id, expand);
        self.client.send(request).await
    }

    /// First page with `title` in `space_key`, if any.
    pub async fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Value>, Error> {
        let request = self.api.get_page_by_title(space_key, title);
        let response = self.client.send(request).await?;
        Ok(results_of(&response).into_iter().next())
    }

    pub async fn get_page_children(
        &self,
        page_id: &str,
        limit: u64,
        start: u64,
        expand: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let request = self.api.get_page_children(page_id, limit, start, expand);
        let response = self.client.send(request).await?;
        Ok(results_of(&response))
    }

    pub async fn create_page(&self, page: &NewPage) -> Result<Value, Error> {
        self.client.send(self.api.create_page(page)).await
    }

    /// Replace title and body. `update.current_version` must be the version
    /// the caller read; the request carries the next one.
    pub async fn update_page(&self, update: &PageUpdate) -> Result<Value, Error> {
        self.client.send(self.api.update_page(update)).await
    }

    pub async fn delete_page(&self, page_id: &str) -> Result<Deletion, Error> {
        let request = self.api.delete_page(page_id);
        Deletion::from_response(self.client.send(request).await)
    }

    pub async fn get_page_comments(&self, page_id: &str) -> Result<Vec<Value>, Error> {
        let request = self.api.get_page_comments(page_id);
        let response = self.client.send(request).await?;
        Ok(results_of(&response))
    }

    pub async fn add_comment(&self, page_id: &str, content: &str) -> Result<Value, Error> {
        self.client
            .send(self.api.add_comment(page_id, content))
            .await
    }

    pub async fn get_page_labels(&self, page_id: &str) -> Result<Vec<Value>, Error> {
        let request = self.api.get_page_labels(page_id);
        let response = self.client.send(request).await?;
        Ok(results_of(&response))
    }

    /// Attach a global label, then return the page's full label list.
    pub async fn add_page_label(&self, page_id: &str, label_name: &str) -> Result<Vec<Value>, Error> {
        let request = self.api.add_page_label(page_id, label_name);
        self.client.send(request).await?;
        self.get_page_labels(page_id).await
    }
}
