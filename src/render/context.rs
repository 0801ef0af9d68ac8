//! Renderer context: the normalized record joined with its exchange rate.

use crate::domain::{InvoiceData, InvoiceDataError};
use crate::exchange::{ExchangeRate, ExchangeService};
use serde_json::{Map, Value};

/// Everything the invoice template sees. Built once per processing run
/// and immutable afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererContext {
    pub data: InvoiceData,
    pub record: Map<String, Value>,
    pub invoice_in_foreign_currency: bool,
    pub exchange: ExchangeRate,
}

impl RendererContext {
    /// Resolve the exchange rate for the record's currency and sale date
    /// (issue date when no sale date is set) and assemble the context.
    pub async fn build(
        record: Map<String, Value>,
        exchange: &ExchangeService,
    ) -> Result<Self, InvoiceDataError> {
        let data = InvoiceData::from_record(&record)?;
        let rate = exchange.get_rate(&data.currency, data.exchange_date()).await;

        Ok(RendererContext {
            invoice_in_foreign_currency: !rate.is_identity(),
            data,
            record,
            exchange: rate,
        })
    }

    /// Flatten into one JSON object for the template: the record's own
    /// fields plus `invoice_in_foreign_currency`, `currency`, `exchange`.
    pub fn to_value(&self) -> Value {
        let mut merged = self.record.clone();
        merged.insert(
            "invoice_in_foreign_currency".to_string(),
            Value::Bool(self.invoice_in_foreign_currency),
        );
        merged.insert(
            "currency".to_string(),
            Value::String(self.data.currency.clone()),
        );
        merged.insert(
            "exchange".to_string(),
            serde_json::to_value(&self.exchange).unwrap_or(Value::Null),
        );
        Value::Object(merged)
    }
}
