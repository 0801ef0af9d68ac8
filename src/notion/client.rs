//! Notion REST API client.

use super::{NotionApi, NotionError};
use crate::domain::RawPage;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

const NOTION_VERSION: &str = "2022-06-28";

/// Client for the Notion v1 page endpoints.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NotionClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn page_url(&self, id: &str) -> String {
        format!("{}/v1/pages/{}", self.base_url, id)
    }

    async fn check_status(
        response: reqwest::Response,
        id: &str,
    ) -> Result<reqwest::Response, NotionError> {
        let status = response.status();
        if status == 404 {
            return Err(NotionError::NotFound(id.to_string()));
        }
        if status == 429 {
            return Err(NotionError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotionError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn fetch_page(&self, id: &str) -> Result<RawPage, NotionError> {
        debug!("Fetching page {}", id);

        let response = self
            .client
            .get(self.page_url(id))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| NotionError::Network(e.to_string()))?;

        let response = Self::check_status(response, id).await?;

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))?;

        Ok(RawPage::from_json(&body))
    }

    async fn update_property(
        &self,
        id: &str,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), NotionError> {
        debug!("Updating page {} property '{}'", id, name);

        let payload = json!({
            "properties": { name: value }
        });

        let response = self
            .client
            .patch(self.page_url(id))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotionError::Network(e.to_string()))?;

        Self::check_status(response, id).await?;
        Ok(())
    }
}
