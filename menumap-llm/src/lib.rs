//! LLM integration for menumap.
//!
//! This crate exposes the [`traits::LlmClient`] interface, the concrete
//! [`gemini::GeminiClient`], and the pieces around a schema-constrained
//! extraction call: the bounded-depth response schema builder
//! ([`schema`]), the rate-limit retry loop ([`retry`]), response parsing
//! ([`parse`]), and the high-level [`extractor::MenuExtractor`].
//!
//! # Examples
//! ```no_run
//! use menumap_llm::extractor::MenuExtractor;
//! use menumap_llm::gemini::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), menumap_llm::traits::LlmError> {
//! let client = GeminiClient::new("key".into(), "gemini-2.5-flash".into())?;
//! let tree = MenuExtractor::new(&client)
//!     .extract_menu("<nav class=\"gnb__aligner\">...</nav>")
//!     .await?;
//! println!("{} entries", tree.entry_count());
//! # Ok(())
//! # }
//! ```
pub mod extractor;
pub mod gemini;
pub mod parse;
pub mod retry;
pub mod schema;
pub mod traits;

/// Default model for menu extraction.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
