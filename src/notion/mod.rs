//! Notion access layer: the remote page API seam, the recursive relation
//! resolver, and the property transformer.

use crate::domain::RawPage;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod client;
pub mod mock;
pub mod resolver;
pub mod transform;

pub use client::NotionClient;
pub use mock::MockNotion;
pub use resolver::PageResolver;
pub use transform::{transform_page, transform_value};

/// Remote page API. Implementations do not retry: transient failures are
/// surfaced to the caller unchanged.
#[async_trait]
pub trait NotionApi: Send + Sync + fmt::Debug {
    /// Fetch a single page by id, without resolving relations.
    async fn fetch_page(&self, id: &str) -> Result<RawPage, NotionError>;

    /// Update one named property on a page. `value` is the raw property
    /// payload, e.g. `{"status": {"name": "Ready"}}`.
    async fn update_property(
        &self,
        id: &str,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), NotionError>;
}

#[derive(Debug, Clone, Error)]
pub enum NotionError {
    #[error("Page not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Rate limited")]
    RateLimited,
    #[error("Parse error: {0}")]
    Parse(String),
}
