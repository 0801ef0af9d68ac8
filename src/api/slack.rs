//! Slack events endpoint: answers URL verification handshakes and acks
//! everything else. Message handling lives outside this service.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::{json, Value};
use tracing::debug;

pub async fn slack_events(Json(payload): Json<Value>) -> Response {
    if payload.get("type").and_then(|v| v.as_str()) == Some("url_verification") {
        let challenge = payload
            .get("challenge")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        return (StatusCode::OK, Json(json!({"challenge": challenge}))).into_response();
    }

    debug!(
        "Acknowledged Slack event: {}",
        payload.get("type").and_then(|v| v.as_str()).unwrap_or("unknown")
    );
    StatusCode::OK.into_response()
}
