use crate::browser::Driver;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One visible link and its viewport bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBox {
    pub text: String,
    pub href: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LinkBox {
    /// One line of the coordinates flat file.
    pub fn coordinate_line(&self) -> String {
        format!(
            "TEXT: {} | HREF: {} | BBOX: x={}, y={}, w={}, h={}",
            self.text,
            self.href,
            format_coord(self.x),
            format_coord(self.y),
            format_coord(self.width),
            format_coord(self.height)
        )
    }
}

/// Whole numbers keep a trailing `.0` so `0` renders as `0.0`.
fn format_coord(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

/// Render the coordinates flat file, one link per line.
pub fn coordinate_lines(links: &[LinkBox]) -> String {
    let mut out = String::new();
    for link in links {
        out.push_str(&link.coordinate_line());
        out.push('\n');
    }
    out
}

/// Everything one capture pass produces for a page.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub url: String,
    pub html: String,
    pub screenshot_png: Vec<u8>,
    pub links: Vec<LinkBox>,
}

/// Seam for page acquisition so orchestration can be tested without a
/// browser.
#[async_trait]
pub trait BrowserCapturer: Send + Sync {
    async fn capture(&self, url: &str, headless: bool, webdriver_url: &str)
        -> Result<PageCapture>;
}

/// Concrete capturer backed by the fantoccini driver.
pub struct FantocciniCapturer;

#[async_trait]
impl BrowserCapturer for FantocciniCapturer {
    async fn capture(
        &self,
        url: &str,
        headless: bool,
        webdriver_url: &str,
    ) -> Result<PageCapture> {
        let mut driver = Driver::new(headless, webdriver_url).await?;
        let result = capture_page(&mut driver, url).await;
        // Always attempt to close the session before returning.
        let _ = driver.close().await;
        result
    }
}

async fn capture_page(driver: &mut Driver, url: &str) -> Result<PageCapture> {
    tracing::info!(%url, "navigating");
    let page = driver.goto(url).await?;

    let html = page.content().await?;
    tracing::info!(bytes = html.len(), "DOM source captured");

    let screenshot_png = page.full_page_screenshot().await?;
    tracing::info!(bytes = screenshot_png.len(), "screenshot captured");

    let links = page.link_geometry().await?;
    tracing::info!(count = links.len(), "link geometry collected");

    Ok(PageCapture {
        url: page.current_url().await.unwrap_or_else(|_| url.to_string()),
        html,
        screenshot_png,
        links,
    })
}
