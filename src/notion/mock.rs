//! Mock Notion API for testing without network calls.

use super::{NotionApi, NotionError};
use crate::domain::RawPage;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory page store recording every update call it receives.
#[derive(Debug, Default)]
pub struct MockNotion {
    pages: HashMap<String, Value>,
    failures: HashMap<String, NotionError>,
    update_failures: HashMap<String, NotionError>,
    fetched: Mutex<Vec<String>>,
    updates: Mutex<Vec<RecordedUpdate>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub page_id: String,
    pub property: String,
    pub value: Value,
}

impl MockNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the given raw page JSON for its `id` field.
    pub fn with_page(mut self, page: Value) -> Self {
        let id = page
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.pages.insert(id, page);
        self
    }

    /// Fail every fetch of `id` with the given error.
    pub fn with_failure(mut self, id: &str, error: NotionError) -> Self {
        self.failures.insert(id.to_string(), error);
        self
    }

    /// Fail every update of the named property with the given error.
    pub fn with_update_failure(mut self, property: &str, error: NotionError) -> Self {
        self.update_failures.insert(property.to_string(), error);
        self
    }

    /// Ids fetched so far, in call order.
    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().expect("lock poisoned").clone()
    }

    /// Property updates recorded so far, in call order.
    pub fn recorded_updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl NotionApi for MockNotion {
    async fn fetch_page(&self, id: &str) -> Result<RawPage, NotionError> {
        self.fetched
            .lock()
            .expect("lock poisoned")
            .push(id.to_string());

        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }

        self.pages
            .get(id)
            .map(RawPage::from_json)
            .ok_or_else(|| NotionError::NotFound(id.to_string()))
    }

    async fn update_property(
        &self,
        id: &str,
        name: &str,
        value: Value,
    ) -> Result<(), NotionError> {
        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }
        if let Some(error) = self.update_failures.get(name) {
            return Err(error.clone());
        }

        self.updates
            .lock()
            .expect("lock poisoned")
            .push(RecordedUpdate {
                page_id: id.to_string(),
                property: name.to_string(),
                value,
            });
        Ok(())
    }
}
