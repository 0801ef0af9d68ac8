//! Invoice rendering: context assembly, HTML templating, PDF conversion.

use thiserror::Error;

pub mod context;
pub mod html;
pub mod pdf;

pub use context::RendererContext;
pub use html::InvoiceRenderer;
pub use pdf::{MockPdfGenerator, PdfGenerator, PdfOptions, WkhtmltopdfGenerator};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),
    #[error("PDF conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
