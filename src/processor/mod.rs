//! Invoice processing state machine.
//!
//! One webhook delivery drives one run: guard on the changed properties
//! and the remote status, mark the page in progress, resolve and render,
//! upload content-addressed, write the file URL back, mark ready. Status
//! writes are best-effort and never mask the pipeline's own error.

use crate::config::Config;
use crate::domain::{InvoiceStatus, PropertyValue, RawPage};
use crate::exchange::ExchangeService;
use crate::notion::{transform_page, NotionApi, NotionError, PageResolver};
use crate::render::{
    InvoiceRenderer, PdfGenerator, PdfOptions, RendererContext, RenderError,
};
use crate::storage::{content_hash, invoice_path, BlobStorage, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Notion(#[from] NotionError),
    #[error(transparent)]
    Invoice(#[from] crate::domain::InvoiceDataError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
#[error("Failed to process invoice for page {page_id}")]
pub struct ProcessError {
    pub page_id: String,
    #[source]
    pub source: PipelineError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Pipeline ran to completion; the invoice PDF is public at this URL.
    Processed { url: String },
    /// Guard rejected the delivery: unrelated property change, or the
    /// page was not in the `Should process` state.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct InvoiceProcessor {
    notion: Arc<dyn NotionApi>,
    resolver: PageResolver,
    exchange: Arc<ExchangeService>,
    renderer: InvoiceRenderer,
    pdf: Arc<dyn PdfGenerator>,
    storage: Arc<dyn BlobStorage>,
    config: Config,
}

impl InvoiceProcessor {
    pub fn new(
        notion: Arc<dyn NotionApi>,
        exchange: Arc<ExchangeService>,
        renderer: InvoiceRenderer,
        pdf: Arc<dyn PdfGenerator>,
        storage: Arc<dyn BlobStorage>,
        config: Config,
    ) -> Self {
        Self {
            resolver: PageResolver::new(notion.clone()),
            notion,
            exchange,
            renderer,
            pdf,
            storage,
            config,
        }
    }

    /// Entry point for one `page.properties_updated` delivery.
    pub async fn process(
        &self,
        page_id: &str,
        updated_properties: &[String],
    ) -> Result<ProcessOutcome, ProcessError> {
        if !updated_properties
            .iter()
            .any(|p| p == &self.config.status_property_id)
        {
            info!("Page {}: status property unchanged, skipping", page_id);
            return Ok(ProcessOutcome::Skipped);
        }

        match self.guard_status(page_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!("Page {}: not in '{}' state, skipping", page_id, InvoiceStatus::ShouldProcess);
                return Ok(ProcessOutcome::Skipped);
            }
            Err(source) => return Err(self.fail(page_id, source).await),
        }

        match self.run_pipeline(page_id).await {
            Ok(url) => Ok(ProcessOutcome::Processed { url }),
            Err(source) => Err(self.fail(page_id, source).await),
        }
    }

    /// Resolve, transform, and join with the exchange rate. Also used by
    /// the on-demand renderer endpoint, which bypasses the state machine.
    pub async fn prepare_context(&self, page_id: &str) -> Result<RendererContext, PipelineError> {
        let tree = self.resolver.resolve(page_id).await?;
        let record = transform_page(&tree);
        let context = RendererContext::build(record, &self.exchange).await?;
        Ok(context)
    }

    pub async fn render_invoice_html(&self, page_id: &str) -> Result<String, PipelineError> {
        let context = self.prepare_context(page_id).await?;
        Ok(self.renderer.render_html(&context)?)
    }

    pub async fn render_invoice_pdf(&self, page_id: &str) -> Result<Vec<u8>, PipelineError> {
        let html = self.render_invoice_html(page_id).await?;
        Ok(self.pdf.generate(&html, &PdfOptions::default()).await?)
    }

    /// True when the page's status property currently reads `Should process`.
    async fn guard_status(&self, page_id: &str) -> Result<bool, PipelineError> {
        let page = self.notion.fetch_page(page_id).await?;
        Ok(read_status(&page, &self.config.status_property_name)
            == Some(InvoiceStatus::ShouldProcess))
    }

    async fn run_pipeline(&self, page_id: &str) -> Result<String, PipelineError> {
        self.write_status(page_id, InvoiceStatus::InProgress).await;

        info!("Preparing context for page {}", page_id);
        let context = self.prepare_context(page_id).await?;

        let html = self.renderer.render_html(&context)?;
        let hash = content_hash(&html);
        let path = invoice_path(&context.data, &hash);

        let url = if self.storage.exists(&path).await {
            info!("Invoice already uploaded, reusing {}", path);
            self.storage.public_url(&path)
        } else {
            info!("Generating PDF for invoice {}", context.data.invoice_number);
            let pdf = self.pdf.generate(&html, &PdfOptions::default()).await?;
            self.storage.save(&pdf, &path, "application/pdf").await?
        };

        self.write_invoice_file(page_id, &context.data.invoice_number, &url)
            .await?;
        self.write_status(page_id, InvoiceStatus::Ready).await;

        info!("Page {} processed, invoice at {}", page_id, url);
        Ok(url)
    }

    async fn fail(&self, page_id: &str, source: PipelineError) -> ProcessError {
        error!("Marking page {} as failed: {}", page_id, source);
        self.write_status(page_id, InvoiceStatus::Error).await;
        ProcessError {
            page_id: page_id.to_string(),
            source,
        }
    }

    /// Best-effort status write: a failure here is logged and swallowed
    /// so it never replaces the pipeline's own outcome.
    async fn write_status(&self, page_id: &str, status: InvoiceStatus) {
        info!("Updating page {} status to '{}'", page_id, status);
        let value = serde_json::json!({"status": {"name": status.as_str()}});
        if let Err(e) = self
            .notion
            .update_property(page_id, &self.config.status_property_name, value)
            .await
        {
            warn!("Error updating page {} status to '{}': {}", page_id, status, e);
        }
    }

    async fn write_invoice_file(
        &self,
        page_id: &str,
        name: &str,
        url: &str,
    ) -> Result<(), PipelineError> {
        info!(
            "Updating page {} '{}' property with URL {}",
            page_id, self.config.invoice_property_name, url
        );
        let value = serde_json::json!({
            "files": [{"name": name, "external": {"url": url}}]
        });
        self.notion
            .update_property(page_id, &self.config.invoice_property_name, value)
            .await?;
        Ok(())
    }
}

fn read_status(page: &RawPage, property_name: &str) -> Option<InvoiceStatus> {
    match page.properties.get(property_name) {
        Some(PropertyValue::Status(Some(option))) => InvoiceStatus::parse(&option.name),
        _ => None,
    }
}
