//! Turning model output into a [`MenuTree`].

use crate::traits::LlmError;
use menumap_common::MenuTree;
use regex::Regex;

/// How much of a rejected response is kept for diagnostics.
const SNIPPET_LEN: usize = 500;

/// Parse the model's text into a menu tree.
///
/// Schema-constrained generation should hand back bare JSON, but models
/// that ignore the mime-type hint sometimes wrap it in a ```json fence, so
/// we tolerate that before giving up. Failure keeps a prefix of the raw
/// response for the error report.
pub fn parse_menu(text: &str) -> Result<MenuTree, LlmError> {
    let json = extract_json_block(text).unwrap_or_else(|| text.trim().to_string());

    serde_json::from_str(&json).map_err(|e| LlmError::MalformedResponse {
        reason: e.to_string(),
        snippet: snippet(text),
    })
}

/// Try to extract a ```json ... ``` fenced block; fall back to the first
/// brace-delimited run.
fn extract_json_block(text: &str) -> Option<String> {
    let re_fence = Regex::new("(?s)```json\\s*(\\{.*?\\})\\s*```").ok()?;
    if let Some(caps) = re_fence.captures(text) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    let re_plain = Regex::new("(?s)(\\{.*\\})").ok()?;
    re_plain
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}
