use anyhow::{Context, Result};
use menumap_config::CaptureConfig;
use menumap_web::capture::{coordinate_lines, BrowserCapturer};
use std::fs;
use tracing::info;

/// One sequential capture pass: navigate, then persist the screenshot,
/// DOM, and link coordinates.
pub async fn run(cfg: &CaptureConfig, capturer: &dyn BrowserCapturer) -> Result<()> {
    info!(url = %cfg.url, headless = cfg.headless, "starting capture");

    let capture = capturer
        .capture(&cfg.url, cfg.headless, &cfg.webdriver_url)
        .await
        .with_context(|| format!("failed to capture {}", cfg.url))?;

    fs::write(&cfg.screenshot_path, &capture.screenshot_png).with_context(|| {
        format!(
            "failed to write screenshot to {}",
            cfg.screenshot_path.display()
        )
    })?;
    info!(path = %cfg.screenshot_path.display(), "screenshot saved");

    fs::write(&cfg.dom_path, &capture.html)
        .with_context(|| format!("failed to write DOM to {}", cfg.dom_path.display()))?;
    info!(path = %cfg.dom_path.display(), bytes = capture.html.len(), "DOM saved");

    fs::write(&cfg.coordinates_path, coordinate_lines(&capture.links)).with_context(|| {
        format!(
            "failed to write coordinates to {}",
            cfg.coordinates_path.display()
        )
    })?;
    info!(
        path = %cfg.coordinates_path.display(),
        links = capture.links.len(),
        "link coordinates saved"
    );

    Ok(())
}
