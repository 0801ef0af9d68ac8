//! HTML to PDF conversion behind an opaque generator seam.

use super::RenderError;
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub page_size: String,
    pub scale: f32,
    pub print_background: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            scale: 0.75,
            print_background: true,
        }
    }
}

#[async_trait]
pub trait PdfGenerator: Send + Sync + fmt::Debug {
    async fn generate(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;
}

/// Converts HTML via the `wkhtmltopdf` binary through temp files.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfGenerator {
    binary: String,
}

impl WkhtmltopdfGenerator {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl PdfGenerator for WkhtmltopdfGenerator {
    async fn generate(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let temp_dir = std::env::temp_dir();
        let html_path = temp_dir.join(format!("invoice_{}.html", uuid::Uuid::new_v4()));
        let pdf_path = temp_dir.join(format!("invoice_{}.pdf", uuid::Uuid::new_v4()));

        tokio::fs::write(&html_path, html).await?;

        let mut command = Command::new(&self.binary);
        command
            .arg("--page-size")
            .arg(&options.page_size)
            .arg("--zoom")
            .arg(options.scale.to_string())
            .arg("--encoding")
            .arg("utf-8");
        if options.print_background {
            command.arg("--background");
        } else {
            command.arg("--no-background");
        }

        let output = command
            .arg(&html_path)
            .arg(&pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "wkhtmltopdf failed");
            let _ = tokio::fs::remove_file(&html_path).await;
            return Err(RenderError::Conversion(stderr.to_string()));
        }

        let pdf_bytes = tokio::fs::read(&pdf_path).await?;

        let _ = tokio::fs::remove_file(&html_path).await;
        let _ = tokio::fs::remove_file(&pdf_path).await;

        info!(size = pdf_bytes.len(), "PDF generated successfully");
        Ok(pdf_bytes)
    }
}

/// Deterministic generator for tests: emits a PDF-looking header followed
/// by the input HTML bytes.
#[derive(Debug, Clone, Default)]
pub struct MockPdfGenerator;

#[async_trait]
impl PdfGenerator for MockPdfGenerator {
    async fn generate(&self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(html.as_bytes());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_is_deterministic() {
        let generator = MockPdfGenerator;
        let options = PdfOptions::default();
        let a = generator.generate("<html/>", &options).await.unwrap();
        let b = generator.generate("<html/>", &options).await.unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(b"%PDF"));
    }

    #[test]
    fn test_default_options() {
        let options = PdfOptions::default();
        assert_eq!(options.page_size, "A4");
        assert!((options.scale - 0.75).abs() < f32::EPSILON);
        assert!(options.print_background);
    }
}
