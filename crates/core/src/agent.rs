//! Agent invoker trait: the boundary to external reasoning agents.
//!
//! An invoker sends a prompt to a named agent and returns its raw text.
//! Nothing about the text is trusted: parsing and validation happen in the
//! contracts crate. Implementations: Claude Code CLI, Anthropic Messages API,
//! and a scripted invoker for tests.

use async_trait::async_trait;
use std::time::Duration;
use crate::error::AgentError;

#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Backend name, for logs (e.g. "claude_cli").
    fn name(&self) -> &str;

    /// Send `prompt` to `agent_name` and return its unprocessed output.
    ///
    /// Must fail with [`AgentError::Timeout`] once `timeout` elapses and with
    /// [`AgentError::Execution`] when the agent reports non-success.
    async fn invoke(
        &self,
        agent_name: &str,
        prompt: &str,
        timeout: Duration,
    ) -> std::result::Result<String, AgentError>;
}
