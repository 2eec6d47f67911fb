//! Agent invoker implementations for triagent.
//!
//! All invokers implement the `triagent_core::AgentInvoker` trait.
//! [`build_invoker`] selects one based on configuration.

pub mod anthropic;
pub mod claude_cli;
pub mod scripted;

pub use anthropic::AnthropicInvoker;
pub use claude_cli::ClaudeCliInvoker;
pub use scripted::{RecordedCall, ScriptedInvoker};

use std::sync::Arc;
use tracing::info;
use triagent_config::{AgentBackend, AgentsConfig};
use triagent_core::{AgentError, AgentInvoker};

/// Build the invoker named by `config.backend`.
pub fn build_invoker(config: &AgentsConfig) -> Result<Arc<dyn AgentInvoker>, AgentError> {
    let invoker: Arc<dyn AgentInvoker> = match config.backend {
        AgentBackend::ClaudeCli => Arc::new(ClaudeCliInvoker::new(&config.claude_bin)),
        AgentBackend::Anthropic => {
            let key = config.api_key.as_deref().ok_or_else(|| {
                AgentError::NotConfigured(
                    "the anthropic backend needs an API key (set ANTHROPIC_API_KEY)".into(),
                )
            })?;
            Arc::new(AnthropicInvoker::new(key).with_model(&config.model))
        }
    };
    info!(backend = %invoker.name(), "Agent invoker ready");
    Ok(invoker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_claude_cli() {
        let invoker = build_invoker(&AgentsConfig::default()).unwrap();
        assert_eq!(invoker.name(), "claude-cli");
    }

    #[test]
    fn anthropic_backend_requires_key() {
        let mut config = AgentsConfig {
            backend: AgentBackend::Anthropic,
            ..AgentsConfig::default()
        };
        assert!(matches!(
            build_invoker(&config),
            Err(AgentError::NotConfigured(_))
        ));

        config.api_key = Some("sk-ant-test".into());
        assert_eq!(build_invoker(&config).unwrap().name(), "anthropic");
    }
}
