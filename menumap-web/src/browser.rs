use crate::capture::LinkBox;
use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// Viewport width used for full-page capture.
const FULL_PAGE_WIDTH: u32 = 1920;
/// Window managers reject absurd heights; cap what we request.
const MAX_PAGE_HEIGHT: u64 = 16_384;

/// Collects every visible link's trimmed text, href, and bounding box.
/// Zero-area and label-less links are dropped in the page, not here.
const LINK_GEOMETRY_JS: &str = r#"
const links = Array.from(document.querySelectorAll('a'));
return links.map(link => {
    const rect = link.getBoundingClientRect();
    return {
        text: link.textContent.trim().replace(/\s+/g, ' '),
        href: link.href,
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height
    };
}).filter(data => data.text && data.width > 0 && data.height > 0);
"#;

const DOCUMENT_HEIGHT_JS: &str = r#"
return Math.max(
    document.body ? document.body.scrollHeight : 0,
    document.documentElement.scrollHeight
);
"#;

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct Driver {
    client: Client,
}

impl Driver {
    /// Create a new driver connected to a running WebDriver service.
    pub async fn new(headless: bool, webdriver_url: &str) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={FULL_PAGE_WIDTH},1080"),
        ];
        if headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));

        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        Ok(Self { client })
    }

    /// Navigate to `url` and return a [`Page`] once the load completes.
    pub async fn goto(&mut self, url: &str) -> Result<Page> {
        self.client.goto(url).await?;
        Ok(Page::new(self.client.clone()))
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// High-level page wrapper over an open session.
pub struct Page {
    client: Client,
}

impl Page {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Return the full page HTML source.
    pub async fn content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    /// Capture a PNG of the whole scrollable page.
    ///
    /// WebDriver screenshots cover only the viewport, so the window is
    /// first resized to the document's scroll height (bounded to keep the
    /// request sane on infinite-scroll pages).
    pub async fn full_page_screenshot(&self) -> Result<Vec<u8>> {
        let height = self.client.execute(DOCUMENT_HEIGHT_JS, vec![]).await?;
        if let Some(h) = height.as_u64() {
            if h > 0 {
                self.client
                    .set_window_size(FULL_PAGE_WIDTH, h.min(MAX_PAGE_HEIGHT) as u32)
                    .await?;
            }
        }
        self.client.screenshot().await.map_err(anyhow::Error::from)
    }

    /// Collect the on-screen geometry of every visible link.
    pub async fn link_geometry(&self) -> Result<Vec<LinkBox>> {
        let value = self.client.execute(LINK_GEOMETRY_JS, vec![]).await?;
        serde_json::from_value(value).map_err(anyhow::Error::from)
    }
}
