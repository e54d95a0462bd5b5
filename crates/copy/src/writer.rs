use std::sync::Arc;

use tidyquote_core::config::LlmConfig;
use tidyquote_core::{format_gbp, QuoteResult};
use tracing::debug;

use crate::llm::{DisabledLlm, HttpLlmClient, LlmClient};

/// Turns a computed breakdown into friendly customer copy. The model only
/// restates numbers the engine already fixed; any failure falls back to a
/// deterministic plain rendering, so quoting never fails because of the
/// LLM.
pub struct QuoteCopywriter {
    client: Arc<dyn LlmClient>,
}

impl QuoteCopywriter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        if !config.enabled {
            return Self::new(Arc::new(DisabledLlm));
        }

        match HttpLlmClient::from_config(config) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(error) => {
                debug!(
                    event_name = "copy.writer.client_unavailable",
                    error = %error,
                    "llm client could not be built, using plain rendering"
                );
                Self::new(Arc::new(DisabledLlm))
            }
        }
    }

    pub async fn narrate(&self, summary: &str, result: &QuoteResult) -> String {
        let prompt = build_prompt(summary, result);

        match self.client.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => render_plain(result),
            Err(error) => {
                debug!(
                    event_name = "copy.writer.fallback",
                    error = %error,
                    "llm narration unavailable, using plain rendering"
                );
                render_plain(result)
            }
        }
    }
}

pub fn build_prompt(summary: &str, result: &QuoteResult) -> String {
    let mut prompt = String::from(
        "You are a quoting assistant for a cleaning company.\n\
         Rewrite the price breakdown below as short, friendly, persuasive copy.\n\
         Use every amount exactly as given. Never change, recompute, or omit a figure.\n\n",
    );
    prompt.push_str(&format!("Request: {summary}\n\nBreakdown:\n"));
    for line in &result.breakdown {
        prompt.push_str(&format!("- {}: {}\n", line.label, format_gbp(line.amount)));
    }
    prompt.push_str(&format!("Total: {}\n", format_gbp(result.total)));
    prompt
}

/// Deterministic fallback rendering used whenever the model is disabled or
/// unavailable.
pub fn render_plain(result: &QuoteResult) -> String {
    let mut out = String::from("Your quote:\n");
    for line in &result.breakdown {
        out.push_str(&format!("  {} \u{2014} {}\n", line.label, format_gbp(line.amount)));
    }
    out.push_str(&format!("Total: {}", format_gbp(result.total)));
    out
}
