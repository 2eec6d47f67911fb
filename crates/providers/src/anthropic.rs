//! Anthropic Messages API invoker.
//!
//! Each agent call is a single-turn request: the agent name becomes the
//! system prompt persona and the task prompt is the only user message.
//! Uses `x-api-key` authentication and the `anthropic-version` header.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use triagent_core::{AgentError, AgentInvoker};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Model used when the configuration leaves it unset.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Runs agents against the Anthropic Messages API.
pub struct AnthropicInvoker {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicInvoker {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn system_prompt(agent_name: &str) -> String {
        format!(
            "You are {agent_name}, a specialized support engineering agent. \
             Follow the task instructions exactly and answer only with the requested JSON."
        )
    }

    fn request_body(&self, agent_name: &str, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": Self::system_prompt(agent_name),
            "messages": [{"role": "user", "content": prompt}],
        })
    }

    /// Concatenate the text blocks of a response.
    fn response_text(resp: MessagesResponse) -> String {
        resp.content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl AgentInvoker for AnthropicInvoker {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn invoke(
        &self,
        agent_name: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, AgentError> {
        let url = format!("{}/v1/messages", self.base_url);
        let execution = |reason: String| AgentError::Execution {
            agent: agent_name.to_string(),
            reason,
        };

        debug!(agent = %agent_name, model = %self.model, "Sending agent request");

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.request_body(agent_name, prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout {
                        agent: agent_name.to_string(),
                        timeout_secs: timeout.as_secs(),
                    }
                } else {
                    execution(format!("network error: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(AgentError::NotConfigured("Invalid Anthropic API key".into()));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(agent = %agent_name, status, body = %body, "Anthropic API error");
            return Err(execution(format!("API error {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| execution(format!("failed to parse Anthropic response: {e}")))?;

        Ok(Self::response_text(parsed))
    }
}

// --- Anthropic API types ---

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}
