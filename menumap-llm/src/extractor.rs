//! High-level GNB menu extraction over any [`LlmClient`].

use crate::parse::parse_menu;
use crate::retry::{with_retry, RetryPolicy};
use crate::schema::{menu_schema, MAX_MENU_DEPTH};
use crate::traits::{LlmClient, LlmError};
use menumap_common::MenuTree;

const GNB_SYSTEM_PROMPT: &str = "You are an expert parser that extracts the global navigation \
(GNB) menu structure from website HTML. Your response must strictly follow the requested JSON \
schema; never include any other text or commentary. Every menu entry above the deepest level \
must carry a 'children' array, and entries at the deepest level must not. Every entry must \
include 'text' and 'href'.";

fn build_menu_prompt(html: &str, max_depth: usize) -> String {
    format!(
        "Extract the site's main navigation (GNB) menu structure from the HTML below as JSON.\n\
        The requested JSON schema explicitly supports menu structures up to {max_depth} levels \
        deep. Nest 'children' arrays to match the actual depth of the menu.\n\n\
        [HTML]\n{html}"
    )
}

/// Drives one schema-constrained extraction call, with the rate-limit
/// retry loop and response parsing folded in.
pub struct MenuExtractor<'a> {
    client: &'a dyn LlmClient,
    policy: RetryPolicy,
    max_depth: usize,
}

impl<'a> MenuExtractor<'a> {
    pub fn new(client: &'a dyn LlmClient) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            max_depth: MAX_MENU_DEPTH,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Send `html` to the model and parse the returned menu tree.
    ///
    /// The schema is built once per call and never mutated afterwards.
    pub async fn extract_menu(&self, html: &str) -> Result<MenuTree, LlmError> {
        let schema = menu_schema(self.max_depth);
        let prompt = build_menu_prompt(html, self.max_depth);

        tracing::info!(
            model = self.client.model_name(),
            html_bytes = html.len(),
            max_depth = self.max_depth,
            "requesting menu extraction"
        );

        let response = with_retry(&self.policy, || {
            self.client
                .generate_structured(&prompt, Some(GNB_SYSTEM_PROMPT), &schema)
        })
        .await?;

        let tree = parse_menu(&response.text)?;
        tracing::info!(
            entries = tree.entry_count(),
            depth = tree.max_depth(),
            tokens = response.tokens_used,
            "menu extracted"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;
    use crate::traits::LlmResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fakes a provider: a fixed number of rate limits, then a canned body.
    struct ScriptedClient {
        rate_limited_calls: u32,
        body: &'static str,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn generate(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _max_tokens: Option<u32>,
            _temperature: Option<f32>,
        ) -> Result<LlmResponse, LlmError> {
            unreachable!("extractor only uses structured generation")
        }

        async fn generate_structured(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            schema: &SchemaNode,
        ) -> Result<LlmResponse, LlmError> {
            assert_eq!(schema.required, vec!["menu"]);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.rate_limited_calls {
                return Err(LlmError::RateLimit);
            }
            Ok(LlmResponse {
                text: self.body.to_string(),
                model: Some("scripted".to_string()),
                tokens_used: Some(42),
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn extracts_after_transient_rate_limit() {
        let client = ScriptedClient {
            rate_limited_calls: 2,
            body: r#"{"menu": [{"text": "Home", "href": "/"}]}"#,
            calls: AtomicU32::new(0),
        };

        let tree = MenuExtractor::new(&client)
            .with_policy(fast_policy())
            .extract_menu("<nav></nav>")
            .await
            .unwrap();

        assert_eq!(tree.menu[0].href, "/");
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_once_retries_are_exhausted() {
        let client = ScriptedClient {
            rate_limited_calls: u32::MAX,
            body: "",
            calls: AtomicU32::new(0),
        };

        let err = MenuExtractor::new(&client)
            .with_policy(fast_policy())
            .extract_menu("<nav></nav>")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_with_prefix() {
        let client = ScriptedClient {
            rate_limited_calls: 0,
            body: "sorry, no menu here",
            calls: AtomicU32::new(0),
        };

        let err = MenuExtractor::new(&client)
            .with_policy(fast_policy())
            .extract_menu("<nav></nav>")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MalformedResponse { .. }));
    }
}
