//! Claude CLI invoker: delegates each call to a `claude --print` subprocess.
//!
//! The named agent is declared inline with `--agents` so no agent files need
//! to exist on disk. The prompt travels as a single argument, never through a
//! shell, so ticket text cannot be interpreted as shell syntax.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use triagent_core::{AgentError, AgentInvoker};

/// Default executable looked up on `PATH`.
pub const DEFAULT_CLAUDE_BIN: &str = "claude";

/// Runs agents through the Claude command-line client.
pub struct ClaudeCliInvoker {
    binary: String,
}

impl ClaudeCliInvoker {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Inline agent definition passed via `--agents`.
    fn agent_definition(agent_name: &str, prompt: &str) -> String {
        let mut definition = serde_json::Map::new();
        definition.insert(
            agent_name.to_string(),
            serde_json::json!({
                "description": format!("Specialized agent for {agent_name}"),
                "prompt": prompt,
            }),
        );
        serde_json::Value::Object(definition).to_string()
    }

    fn command(&self, agent_name: &str, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--print")
            .arg("--agents")
            .arg(Self::agent_definition(agent_name, prompt))
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for ClaudeCliInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_CLAUDE_BIN)
    }
}

#[async_trait]
impl AgentInvoker for ClaudeCliInvoker {
    fn name(&self) -> &str {
        "claude-cli"
    }

    async fn invoke(
        &self,
        agent_name: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, AgentError> {
        let preview: String = prompt.chars().take(100).collect();
        debug!(
            agent = %agent_name,
            binary = %self.binary,
            prompt = %preview,
            "Spawning agent process"
        );

        let run = self.command(agent_name, prompt).output();
        let output = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AgentError::Execution {
                    agent: agent_name.to_string(),
                    reason: format!("failed to run '{}': {e}", self.binary),
                });
            }
            Err(_) => {
                warn!(
                    agent = %agent_name,
                    timeout_secs = timeout.as_secs(),
                    "Agent process timed out"
                );
                return Err(AgentError::Timeout {
                    agent: agent_name.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(agent = %agent_name, exit_code = code, stderr = %stderr, "Agent process failed");
            return Err(AgentError::Execution {
                agent: agent_name.to_string(),
                reason: format!("exit code {code}: {stderr}"),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_definition_names_the_agent() {
        let def = ClaudeCliInvoker::agent_definition("bug-hunter", "Assess severity");
        let value: serde_json::Value = serde_json::from_str(&def).unwrap();
        assert_eq!(value["bug-hunter"]["prompt"], "Assess severity");
        assert_eq!(
            value["bug-hunter"]["description"],
            "Specialized agent for bug-hunter"
        );
    }

    #[test]
    fn prompt_is_passed_as_single_argument() {
        let invoker = ClaudeCliInvoker::default();
        let cmd = invoker.command("analysis-expert", "it's broken; rm -rf /");
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], "--print");
        assert_eq!(args[3], "it's broken; rm -rf /");
    }

    #[tokio::test]
    async fn missing_binary_is_an_execution_error() {
        let invoker = ClaudeCliInvoker::new("triagent-definitely-not-installed");
        let err = invoker
            .invoke("analysis-expert", "hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Execution { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_execution_error() {
        let invoker = ClaudeCliInvoker::new("false");
        let err = invoker
            .invoke("bug-hunter", "hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            AgentError::Execution { agent, reason } => {
                assert_eq!(agent, "bug-hunter");
                assert!(reason.starts_with("exit code 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_returned_verbatim() {
        // `echo` prints its arguments, which stands in for agent output.
        let invoker = ClaudeCliInvoker::new("echo");
        let out = invoker
            .invoke("bug-hunter", "{\"ok\": true}", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.trim_end().ends_with("{\"ok\": true}"));
    }
}
