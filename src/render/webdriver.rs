use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::time::Duration;
use thirtyfour::common::print::{PrintOrientation, PrintParameters};
use thirtyfour::prelude::*;
use tracing::{debug, warn};

use super::PdfRenderer;

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Prints HTML through a headless Chrome reached at `webdriver_url`.
///
/// Each call opens its own browser session, so the renderer holds no
/// state between documents.
pub struct WebDriverPdfRenderer {
    webdriver_url: String,
}

impl WebDriverPdfRenderer {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    fn capabilities() -> Result<Capabilities> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless=new").context("Failed to add headless arg")?;
        caps.add_arg("--no-sandbox").context("Failed to add no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")
            .context("Failed to add disable-dev-shm")?;
        Ok(caps.into())
    }

    async fn print(driver: &WebDriver, html: &str) -> Result<Vec<u8>> {
        driver
            .set_page_load_timeout(PAGE_LOAD_TIMEOUT)
            .await
            .context("Failed to set page load timeout")?;

        let url = format!("data:text/html;base64,{}", STANDARD.encode(html));
        driver.goto(url).await.context("Failed to load proposal HTML")?;

        let params = PrintParameters {
            orientation: PrintOrientation::Portrait,
            ..Default::default()
        };
        let encoded = driver
            .print_page_base64(params)
            .await
            .context("Print to PDF failed")?;

        STANDARD
            .decode(encoded.trim())
            .context("Browser returned invalid base64 PDF data")
    }
}

#[async_trait]
impl PdfRenderer for WebDriverPdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let driver = WebDriver::new(&self.webdriver_url, Self::capabilities()?)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", self.webdriver_url))?;

        let result = Self::print(&driver, html).await;

        if let Err(e) = driver.quit().await {
            warn!("Failed to close browser session: {}", e);
        }

        let bytes = result?;
        debug!("Rendered PDF: {} bytes", bytes.len());
        Ok(bytes)
    }
}
