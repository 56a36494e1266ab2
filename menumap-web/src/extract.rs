//! Slicing the navigation section out of a captured DOM.
//!
//! Sending a whole page to the model burns tokens for nothing, so we cut
//! the GNB out first and only fall back to the full document when neither
//! selector matches.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// The navigation wrapper the original site uses.
pub const DEFAULT_NAV_SELECTOR: &str = "nav.gnb__aligner";
/// Tried when the primary selector matches nothing.
pub const DEFAULT_FALLBACK_SELECTOR: &str = "header";

/// Which selector ended up supplying the extracted markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSource {
    Primary,
    Fallback,
    FullDocument,
}

/// Extract the navigation section from `html`.
///
/// Tries `selector`, then `fallback`, then hands back the full document.
/// The full-document path is a quota risk on large pages and is logged as
/// a warning; truncation is deliberately not attempted.
pub fn extract_nav_section(
    html: &str,
    selector: &str,
    fallback: &str,
) -> Result<(String, NavSource)> {
    let document = Html::parse_document(html);

    let primary =
        Selector::parse(selector).map_err(|e| anyhow!("invalid selector '{selector}': {e}"))?;
    if let Some(element) = document.select(&primary).next() {
        let section = element.html();
        tracing::info!(
            selector,
            bytes = section.len(),
            "navigation section extracted"
        );
        return Ok((section, NavSource::Primary));
    }

    let secondary =
        Selector::parse(fallback).map_err(|e| anyhow!("invalid selector '{fallback}': {e}"))?;
    if let Some(element) = document.select(&secondary).next() {
        let section = element.html();
        tracing::info!(
            selector = fallback,
            bytes = section.len(),
            "primary selector missed; using fallback section"
        );
        return Ok((section, NavSource::Fallback));
    }

    tracing::warn!(
        bytes = html.len(),
        "no navigation section matched; sending the full document (quota risk on large pages)"
    );
    Ok((html.to_string(), NavSource::FullDocument))
}
