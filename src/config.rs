use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub notion_api_key: String,
    pub notion_api_url: String,
    pub notion_webhook_token: Option<String>,
    pub status_property_id: String,
    pub status_property_name: String,
    pub invoice_property_name: String,
    pub nbp_api_url: String,
    pub base_currency: String,
    pub rate_retries: u32,
    pub rate_cache_ttl_secs: u64,
    pub storage_bucket: String,
    pub storage_upload_url: String,
    pub storage_token: Option<String>,
    pub pdf_binary: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let notion_api_key = env_map
            .get("NOTION_API_KEY")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("NOTION_API_KEY".to_string()))?;

        let notion_api_url = env_map
            .get("NOTION_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.notion.com".to_string());

        let notion_webhook_token = env_map.get("NOTION_WEBHOOK_TOKEN").cloned();

        let status_property_id = env_map
            .get("STATUS_PROPERTY_ID")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("STATUS_PROPERTY_ID".to_string()))?;

        let status_property_name = env_map
            .get("STATUS_PROPERTY_NAME")
            .cloned()
            .unwrap_or_else(|| "Status".to_string());

        let invoice_property_name = env_map
            .get("INVOICE_PROPERTY_NAME")
            .cloned()
            .unwrap_or_else(|| "Invoice".to_string());

        let nbp_api_url = env_map
            .get("NBP_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.nbp.pl".to_string());

        let base_currency = env_map
            .get("BASE_CURRENCY")
            .cloned()
            .unwrap_or_else(|| "PLN".to_string());

        let rate_retries = env_map
            .get("RATE_RETRIES")
            .map(|s| s.as_str())
            .unwrap_or("5")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "RATE_RETRIES".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?;

        let rate_cache_ttl_secs = env_map
            .get("RATE_CACHE_TTL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("3600")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "RATE_CACHE_TTL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let storage_bucket = env_map
            .get("STORAGE_BUCKET")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("STORAGE_BUCKET".to_string()))?;

        let storage_upload_url = env_map
            .get("STORAGE_UPLOAD_URL")
            .cloned()
            .unwrap_or_else(|| "https://storage.googleapis.com/upload/storage/v1".to_string());

        let storage_token = env_map.get("STORAGE_TOKEN").cloned();

        let pdf_binary = env_map
            .get("PDF_BINARY")
            .cloned()
            .unwrap_or_else(|| "wkhtmltopdf".to_string());

        Ok(Config {
            port,
            notion_api_key,
            notion_api_url,
            notion_webhook_token,
            status_property_id,
            status_property_name,
            invoice_property_name,
            nbp_api_url,
            base_currency,
            rate_retries,
            rate_cache_ttl_secs,
            storage_bucket,
            storage_upload_url,
            storage_token,
            pdf_binary,
        })
    }
}
