//! Browser capture and navigation-section extraction.
//!
//! - `browser`: thin fantoccini wrapper over a running chromedriver
//!   (navigation, DOM source, full-page screenshots, link geometry)
//! - `capture`: the [`capture::BrowserCapturer`] seam and the coordinate
//!   flat-file format
//! - `extract`: `scraper`-based GNB section slicing with fallbacks

pub mod browser;
pub mod capture;
pub mod extract;
