pub mod events;
pub mod health;
pub mod invoice;
pub mod slack;

use crate::config::Config;
use crate::processor::InvoiceProcessor;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<InvoiceProcessor>,
    pub config: Config,
}

impl AppState {
    pub fn new(processor: Arc<InvoiceProcessor>, config: Config) -> Self {
        Self { processor, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/notion/events", post(events::notion_events))
        .route("/slack/events", post(slack::slack_events))
        .route("/invoice/:id", get(invoice::get_invoice))
        .layer(cors)
        .with_state(state)
}
