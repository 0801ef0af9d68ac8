//! On-demand invoice rendering, bypassing the processing state machine.

use super::AppState;
use crate::error::AppError;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub format: Option<String>,
}

pub async fn get_invoice(
    Path(id): Path<String>,
    Query(params): Query<InvoiceQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let page_id = parse_page_id(&id)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid page ID: {}", id)))?;

    match params.format.as_deref().unwrap_or("html") {
        "html" => {
            let html = state.processor.render_invoice_html(&page_id).await?;
            Ok(Html(html).into_response())
        }
        "pdf" => {
            let pdf = state.processor.render_invoice_pdf(&page_id).await?;
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        "inline; filename=\"invoice.pdf\"".to_string(),
                    ),
                ],
                pdf,
            )
                .into_response())
        }
        other => Err(AppError::BadRequest(format!("Unsupported format: {}", other))),
    }
}

/// Accepts dashed or undashed page ids (optionally from a Notion URL tail)
/// and normalizes to the dashed canonical form.
fn parse_page_id(input: &str) -> Option<String> {
    let tail = input.rsplit(['/', '-']).next().unwrap_or(input);
    let candidate = if tail.len() == 32 { tail } else { input };
    let hex: String = candidate
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase();

    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHED: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
    const UNDASHED: &str = "598337872cf94fdf8782e53db20768a5";

    #[test]
    fn test_parse_undashed_id() {
        assert_eq!(parse_page_id(UNDASHED).as_deref(), Some(DASHED));
    }

    #[test]
    fn test_parse_dashed_id() {
        assert_eq!(parse_page_id(DASHED).as_deref(), Some(DASHED));
    }

    #[test]
    fn test_parse_url_tail() {
        let url = format!("Invoice-march-{}", UNDASHED);
        assert_eq!(parse_page_id(&url).as_deref(), Some(DASHED));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_page_id("not-a-page-id"), None);
        assert_eq!(parse_page_id(""), None);
    }
}
