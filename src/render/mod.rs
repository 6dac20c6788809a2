//! HTML to PDF conversion
//!
//! The document stage talks to a [`PdfRenderer`]; the shipped backend
//! drives a headless browser over WebDriver and uses its print-to-PDF.

pub mod webdriver;

pub use webdriver::WebDriverPdfRenderer;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Convert a complete HTML document to PDF bytes.
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>>;
}
