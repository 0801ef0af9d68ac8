//! In-memory blob store for testing.

use super::{BlobStorage, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    save_count: Mutex<usize>,
    fail_saves: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every save with an HTTP 500.
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock().expect("lock poisoned")
    }

    pub fn stored_paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self
            .objects
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStorage for MemoryStorage {
    async fn save(
        &self,
        bytes: &[u8],
        path: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_saves {
            return Err(StorageError::Http {
                status: 500,
                message: "injected failure".to_string(),
            });
        }

        *self.save_count.lock().expect("lock poisoned") += 1;
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert(path.to_string(), bytes.to_vec());
        Ok(self.public_url(path))
    }

    async fn exists(&self, path: &str) -> bool {
        self.objects.lock().expect("lock poisoned").contains_key(path)
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}
