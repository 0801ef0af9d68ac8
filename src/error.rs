use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<crate::notion::NotionError> for AppError {
    fn from(err: crate::notion::NotionError) -> Self {
        match err {
            crate::notion::NotionError::NotFound(id) => {
                AppError::NotFound(format!("page {}", id))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<crate::processor::PipelineError> for AppError {
    fn from(err: crate::processor::PipelineError) -> Self {
        match err {
            crate::processor::PipelineError::Notion(e) => e.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<crate::render::RenderError> for AppError {
    fn from(err: crate::render::RenderError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
