//! Notion webhook endpoint.
//!
//! Deliveries are acknowledged immediately; processing runs in a spawned
//! task, and failures surface only through the page's status property and
//! the logs, never through the webhook response.

use super::AppState;
use crate::config::Config;
use crate::error::AppError;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{error, info};

type HmacSha256 = Hmac<Sha256>;

pub const PAGE_PROPERTIES_UPDATED: &str = "page.properties_updated";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub entity: WebhookEntity,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub updated_properties: Vec<String>,
}

pub async fn notion_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    // Subscription handshake: Notion sends the verification token once,
    // before any signed deliveries.
    if let Some(token) = payload
        .get("verification_token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
    {
        // Chars, not bytes: the token is attacker-supplied and may not
        // have a char boundary at byte 8.
        let prefix: String = token.chars().take(8).collect();
        info!(
            "Received Notion webhook verification request, token prefix: {}...",
            prefix
        );
        return Ok((StatusCode::OK, Json(json!({"success": true}))).into_response());
    }

    verify_signature(&state.config, &headers, &body)?;

    let event: WebhookEvent = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid event shape: {}", e)))?;

    if event.event_type == PAGE_PROPERTIES_UPDATED && event.entity.entity_type == "page" {
        let processor = state.processor.clone();
        tokio::spawn(async move {
            if let Err(e) = processor
                .process(&event.entity.id, &event.data.updated_properties)
                .await
            {
                error!("{}: {}", e, e.source);
            }
        });
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// HMAC-SHA256 check over the raw body against `X-Notion-Signature`.
/// A missing configured token disables verification.
fn verify_signature(config: &Config, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
    let Some(token) = config.notion_webhook_token.as_deref() else {
        return Ok(());
    };

    let signature = headers
        .get("x-notion-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;

    let hex_part = signature
        .strip_prefix("sha256=")
        .ok_or_else(|| AppError::Unauthorized("Malformed webhook signature".to_string()))?;

    let expected = hex::decode(hex_part)
        .map_err(|_| AppError::Unauthorized("Malformed webhook signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(token.as_bytes())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| AppError::Unauthorized("Webhook signature mismatch".to_string()))
}
