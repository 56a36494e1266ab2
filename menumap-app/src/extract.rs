use anyhow::{anyhow, bail, Context, Result};
use menumap_config::ExtractConfig;
use menumap_llm::extractor::MenuExtractor;
use menumap_llm::gemini::GeminiClient;
use menumap_llm::retry::RetryPolicy;
use menumap_llm::traits::LlmError;
use menumap_web::extract::extract_nav_section;
use std::fs;
use std::time::Duration;
use tracing::{error, info};

/// One sequential extraction pass: read the saved DOM, slice the GNB,
/// call Gemini under the retry policy, and persist the menu JSON.
pub async fn run(cfg: &ExtractConfig) -> Result<()> {
    let html = match fs::read_to_string(&cfg.html_path) {
        Ok(html) => html,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!(
                "input file not found: {} (run `menumap capture` first)",
                cfg.html_path.display()
            );
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read {}", cfg.html_path.display()));
        }
    };
    info!(path = %cfg.html_path.display(), bytes = html.len(), "DOM loaded");

    let (section, _source) = extract_nav_section(&html, &cfg.selector, &cfg.fallback_selector)?;

    let api_key = resolve_api_key(cfg.api_key.as_deref())?;
    let client = GeminiClient::new(api_key, cfg.model.clone())
        .map_err(|e| anyhow!("failed to build Gemini client: {e}"))?;

    let tree = MenuExtractor::new(&client)
        .with_policy(RetryPolicy {
            max_attempts: cfg.retry.max_attempts,
            delay: Duration::from_secs(cfg.retry.delay_secs),
        })
        .with_max_depth(cfg.max_depth)
        .extract_menu(&section)
        .await
        .map_err(report_llm_failure)?;

    let json = serde_json::to_string_pretty(&tree)?;
    fs::write(&cfg.output_path, json)
        .with_context(|| format!("failed to write menu to {}", cfg.output_path.display()))?;
    info!(
        path = %cfg.output_path.display(),
        entries = tree.entry_count(),
        depth = tree.max_depth(),
        "menu written"
    );

    Ok(())
}

/// The config value wins; the `GEMINI_API_KEY` variable is the fallback.
/// A value still containing `${` is an unexpanded reference and counts as
/// missing.
fn resolve_api_key(configured: Option<&str>) -> Result<String> {
    if let Some(key) = configured {
        if !key.is_empty() && !key.contains("${") {
            return Ok(key.to_string());
        }
    }

    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            anyhow!("no Gemini API key configured; set GEMINI_API_KEY or extract.api_key")
        })
}

/// Log the terminal classification before handing the error up.
fn report_llm_failure(err: LlmError) -> anyhow::Error {
    match &err {
        LlmError::RetriesExhausted { attempts } => {
            error!(
                attempts = *attempts,
                "rate limit retries exhausted; the API quota may be depleted, try again later"
            );
        }
        LlmError::InvalidApiKey => {
            error!("the configured API key was rejected; check your key settings");
        }
        LlmError::MalformedResponse { snippet, .. } => {
            error!(%snippet, "model response was not valid JSON");
        }
        _ => {}
    }
    anyhow::Error::from(err)
}
