//! Blob storage seam and content-addressed invoice paths.

use crate::domain::InvoiceData;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

pub mod gcs;
pub mod memory;

pub use gcs::GcsStorage;
pub use memory::MemoryStorage;

const INVOICES_ROOT: &str = "invoices";

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
}

/// Opaque blob store. `exists` degrades to `false` on error so lookups
/// never block an upload.
#[async_trait]
pub trait BlobStorage: Send + Sync + fmt::Debug {
    /// Store bytes under `path`, returning a public URL.
    async fn save(
        &self,
        bytes: &[u8],
        path: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn exists(&self, path: &str) -> bool;

    /// Public URL for `path` without touching the store.
    fn public_url(&self, path: &str) -> String;
}

/// First 16 hex chars of the SHA-256 of the rendered content. Identical
/// invoices land on identical paths and are never re-uploaded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

/// Storage path for an invoice: `invoices/{YYYY-MM}/{client}-{number}-{hash}.pdf`,
/// slugified with case preserved.
pub fn invoice_path(data: &InvoiceData, hash: &str) -> String {
    let folder = data.issue_date.format("%Y-%m");
    let file_name = slugify(&format!(
        "{}-{}-{}",
        data.client_id, data.invoice_number, hash
    ));
    format!("{}/{}/{}.pdf", INVOICES_ROOT, folder, file_name)
}

/// Whitespace runs become single dashes; anything outside
/// `[A-Za-z0-9._-]` is dropped. Case is preserved.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_dash = false;
    for c in input.trim().chars() {
        if c.is_whitespace() {
            if !last_was_dash {
                slug.push('-');
                last_was_dash = true;
            }
        } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            slug.push(c);
            last_was_dash = false;
        }
    }
    slug
}
