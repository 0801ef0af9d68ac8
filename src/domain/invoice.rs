//! Typed invoice view over a normalized page record, plus the processing
//! status persisted on the remote page.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

/// Processing state stored in the page's status property. `ShouldProcess`
/// is only ever read, never written by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    ShouldProcess,
    InProgress,
    Ready,
    Error,
}

impl InvoiceStatus {
    /// Display name as it appears in the remote status property.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::ShouldProcess => "Should process",
            InvoiceStatus::InProgress => "In progress",
            InvoiceStatus::Ready => "Ready",
            InvoiceStatus::Error => "Error",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Should process" => Some(InvoiceStatus::ShouldProcess),
            "In progress" => Some(InvoiceStatus::InProgress),
            "Ready" => Some(InvoiceStatus::Ready),
            "Error" => Some(InvoiceStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum InvoiceDataError {
    #[error("Missing required invoice field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for invoice field {0}: {1}")]
    InvalidField(&'static str, String),
}

/// The fields the pipeline itself needs from a normalized invoice record.
/// Everything else stays inside the record and flows to the template as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceData {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub sale_date: Option<NaiveDate>,
    pub currency: String,
    pub client_id: String,
}

impl InvoiceData {
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, InvoiceDataError> {
        let invoice_number = record
            .get("invoice_number")
            .and_then(|v| v.as_str())
            .ok_or(InvoiceDataError::MissingField("invoice_number"))?
            .to_string();

        let issue_date = parse_date_field(record.get("issue_date"), "issue_date")?
            .ok_or(InvoiceDataError::MissingField("issue_date"))?;

        let sale_date = parse_date_field(record.get("sale_date"), "sale_date")?;

        let first_entry = record
            .get("entries")
            .and_then(|v| v.as_array())
            .and_then(|entries| entries.first())
            .ok_or(InvoiceDataError::MissingField("entries"))?;

        let currency = first_entry
            .get("currency")
            .and_then(|v| v.as_str())
            .ok_or(InvoiceDataError::MissingField("entries[0].currency"))?
            .to_string();

        let client_id = record
            .get("client")
            .and_then(|v| v.as_array())
            .and_then(|clients| clients.first())
            .and_then(|c| c.get("id"))
            .and_then(|v| v.as_str())
            .ok_or(InvoiceDataError::MissingField("client[0].id"))?
            .to_string();

        Ok(InvoiceData {
            invoice_number,
            issue_date,
            sale_date,
            currency,
            client_id,
        })
    }

    /// Exchange rate lookup date: sale date when set, issue date otherwise.
    pub fn exchange_date(&self) -> NaiveDate {
        self.sale_date.unwrap_or(self.issue_date)
    }
}

/// Normalized date values are either a plain start string or a
/// `{start, end}` pair. Datetime strings are truncated to the date part.
fn parse_date_field(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<NaiveDate>, InvoiceDataError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(obj)) => match obj.get("start").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => return Ok(None),
        },
        Some(other) => {
            return Err(InvoiceDataError::InvalidField(field, other.to_string()));
        }
    };

    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| InvoiceDataError::InvalidField(field, raw.to_string()))
}
