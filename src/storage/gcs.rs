//! Google Cloud Storage uploads via the JSON API media endpoint.

use super::{BlobStorage, StorageError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct GcsStorage {
    client: Client,
    upload_base: String,
    bucket: String,
    token: Option<String>,
}

impl GcsStorage {
    pub fn new(upload_base: String, bucket: String, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            upload_base,
            bucket,
            token,
        }
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStorage for GcsStorage {
    async fn save(
        &self,
        bytes: &[u8],
        path: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        debug!("Uploading file: {}", path);

        let url = format!(
            "{}/b/{}/o?uploadType=media&name={}",
            self.upload_base, self.bucket, path
        );

        let response = self
            .with_auth(self.client.post(&url))
            .header("Content-Type", content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let public_url = self.public_url(path);
        info!("File uploaded successfully: {}", public_url);
        Ok(public_url)
    }

    async fn exists(&self, path: &str) -> bool {
        let url = self.public_url(path);
        match self.with_auth(self.client.head(&url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                error!("Error checking file existence: {}: {}", path, e);
                false
            }
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, path)
    }
}
