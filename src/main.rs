use faktura::api::{self, AppState};
use faktura::config::Config;
use faktura::exchange::{ExchangeService, NbpRateProvider};
use faktura::notion::NotionClient;
use faktura::processor::InvoiceProcessor;
use faktura::render::{InvoiceRenderer, WkhtmltopdfGenerator};
use faktura::storage::GcsStorage;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let notion = Arc::new(NotionClient::new(
        config.notion_api_url.clone(),
        config.notion_api_key.clone(),
    ));
    let exchange = Arc::new(ExchangeService::new(
        Arc::new(NbpRateProvider::new(config.nbp_api_url.clone())),
        config.base_currency.clone(),
        config.rate_retries,
        Duration::from_secs(config.rate_cache_ttl_secs),
    ));
    let renderer = match InvoiceRenderer::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Template error: {}", e);
            std::process::exit(1);
        }
    };
    let pdf = Arc::new(WkhtmltopdfGenerator::new(config.pdf_binary.clone()));
    let storage = Arc::new(GcsStorage::new(
        config.storage_upload_url.clone(),
        config.storage_bucket.clone(),
        config.storage_token.clone(),
    ));

    let processor = Arc::new(InvoiceProcessor::new(
        notion,
        exchange,
        renderer,
        pdf,
        storage,
        config.clone(),
    ));

    // Create router
    let app = api::create_router(AppState::new(processor, config));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
