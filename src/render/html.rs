//! HTML invoice rendering with an embedded tera template.

use super::{RendererContext, RenderError};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

const INVOICE_TEMPLATE: &str = "invoice.html.tera";

#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    tera: Tera,
}

impl InvoiceRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.register_filter("money", money_filter);
        tera.add_raw_template(
            INVOICE_TEMPLATE,
            include_str!("../../templates/invoice.html.tera"),
        )
        .map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    pub fn render_html(&self, context: &RendererContext) -> Result<String, RenderError> {
        debug!(
            "Rendering invoice {} for client {}",
            context.data.invoice_number, context.data.client_id
        );

        let tera_context = tera::Context::from_value(context.to_value())
            .map_err(|e| RenderError::Template(e.to_string()))?;

        self.tera
            .render(INVOICE_TEMPLATE, &tera_context)
            .map_err(|e| RenderError::Template(e.to_string()))
    }
}

/// Formats a number to 2 decimal places. Usage: `amount | money`.
fn money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let num = match value {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(tera::Value::String(format!("{:.2}", num)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvoiceData;
    use crate::exchange::ExchangeRate;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn sample_context(rate: &str) -> RendererContext {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let rate = Decimal::from_str(rate).unwrap();
        let record = json!({
            "invoice_number": "INV-001",
            "issue_date": "2024-03-15",
            "entries": [{"name": "Consulting", "currency": "EUR", "amount": 100.0}],
            "client": [{"id": "c1", "name": "Acme Sp. z o.o."}]
        })
        .as_object()
        .unwrap()
        .clone();

        RendererContext {
            data: InvoiceData {
                invoice_number: "INV-001".to_string(),
                issue_date: date,
                sale_date: None,
                currency: "EUR".to_string(),
                client_id: "c1".to_string(),
            },
            record,
            invoice_in_foreign_currency: rate != Decimal::ONE,
            exchange: ExchangeRate {
                currency: "EUR".to_string(),
                reference_number: "053/A/NBP/2024".to_string(),
                date,
                rate,
            },
        }
    }

    #[test]
    fn test_renders_invoice_fields() {
        let renderer = InvoiceRenderer::new().unwrap();
        let html = renderer.render_html(&sample_context("4.31")).unwrap();
        assert!(html.contains("INV-001"));
        assert!(html.contains("Acme Sp. z o.o."));
        assert!(html.contains("Consulting"));
        assert!(html.contains("053/A/NBP/2024"));
    }

    #[test]
    fn test_identity_rate_hides_exchange_block() {
        let renderer = InvoiceRenderer::new().unwrap();
        let html = renderer.render_html(&sample_context("1")).unwrap();
        assert!(!html.contains("Exchange rate"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = InvoiceRenderer::new().unwrap();
        let a = renderer.render_html(&sample_context("4.31")).unwrap();
        let b = renderer.render_html(&sample_context("4.31")).unwrap();
        assert_eq!(a, b);
    }
}
