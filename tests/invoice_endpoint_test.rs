use axum::http::StatusCode;
use chrono::NaiveDate;
use faktura::api::{self, AppState};
use faktura::config::Config;
use faktura::exchange::{ExchangeService, MockRateProvider};
use faktura::notion::MockNotion;
use faktura::processor::InvoiceProcessor;
use faktura::render::{InvoiceRenderer, MockPdfGenerator};
use faktura::storage::MemoryStorage;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
const PAGE_ID_UNDASHED: &str = "598337872cf94fdf8782e53db20768a5";

fn setup_test_app() -> (axum::Router, Arc<MockNotion>) {
    let notion = Arc::new(
        MockNotion::new()
            .with_page(json!({
                "id": PAGE_ID,
                "properties": {
                    "Status": {"type": "status", "status": {"name": "Should process"}},
                    "Invoice number": {"type": "title", "title": [{"plain_text": "INV-001"}]},
                    "Issue date": {"type": "date", "date": {"start": "2024-03-15", "end": null}},
                    "Entries": {"type": "relation", "relation": [{"id": "e1"}]},
                    "Client": {"type": "relation", "relation": [{"id": "c1"}]}
                }
            }))
            .with_page(json!({
                "id": "e1",
                "properties": {
                    "Name": {"type": "title", "title": [{"plain_text": "Consulting"}]},
                    "Currency": {"type": "select", "select": {"name": "EUR"}},
                    "Amount": {"type": "number", "number": 100.0}
                }
            }))
            .with_page(json!({
                "id": "c1",
                "properties": {
                    "Name": {"type": "title", "title": [{"plain_text": "Acme"}]}
                }
            })),
    );

    let mut env = HashMap::new();
    env.insert("NOTION_API_KEY".to_string(), "secret".to_string());
    env.insert("STATUS_PROPERTY_ID".to_string(), "stat-1".to_string());
    env.insert("STORAGE_BUCKET".to_string(), "test".to_string());
    let config = Config::from_env_map(env).unwrap();

    let exchange = Arc::new(ExchangeService::new(
        Arc::new(MockRateProvider::new().with_rate(
            "EUR",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Decimal::from_str("4.31").unwrap(),
        )),
        "PLN".to_string(),
        5,
        Duration::from_secs(3600),
    ));

    let processor = Arc::new(InvoiceProcessor::new(
        notion.clone(),
        exchange,
        InvoiceRenderer::new().unwrap(),
        Arc::new(MockPdfGenerator),
        Arc::new(MemoryStorage::new()),
        config.clone(),
    ));

    (api::create_router(AppState::new(processor, config)), notion)
}

async fn get(app: axum::Router, uri: &str) -> axum::http::Response<axum::body::Body> {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_html_render_contains_invoice_fields() {
    let (app, notion) = setup_test_app();

    let response = get(app, &format!("/invoice/{}", PAGE_ID_UNDASHED)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("INV-001"));
    assert!(html.contains("Acme"));
    assert!(html.contains("Exchange rate"));

    // On-demand rendering never touches the page status.
    assert!(notion.recorded_updates().is_empty());
}

#[tokio::test]
async fn test_pdf_format_sets_content_headers() {
    let (app, _notion) = setup_test_app();

    let response = get(app, &format!("/invoice/{}?format=pdf", PAGE_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_unsupported_format_is_bad_request() {
    let (app, _notion) = setup_test_app();
    let response = get(app, &format!("/invoice/{}?format=docx", PAGE_ID)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_page_id_is_bad_request() {
    let (app, _notion) = setup_test_app();
    let response = get(app, "/invoice/not-a-page").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let (app, _notion) = setup_test_app();
    let response = get(app, "/invoice/00000000000000000000000000000000").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
