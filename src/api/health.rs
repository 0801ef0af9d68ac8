use super::AppState;
use axum::{extract::State, Json};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok", "service": "faktura"}))
}

/// Readiness reflects startup wiring: the invoice template is compiled
/// when the processor is constructed, so a live state means rendering
/// and the configured storage target are available.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ready",
        "bucket": state.config.storage_bucket,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_service() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "faktura");
    }
}
