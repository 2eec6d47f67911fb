//! Scripted invoker: replays canned agent replies for tests and dry runs.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use triagent_core::{AgentError, AgentInvoker};

/// An invocation seen by a [`ScriptedInvoker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub agent: String,
    pub prompt: String,
}

/// Returns queued replies per agent name, in order.
///
/// An agent whose queue is empty gets an [`AgentError::Execution`].
#[derive(Default)]
pub struct ScriptedInvoker {
    replies: Mutex<HashMap<String, VecDeque<Result<String, AgentError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `agent`.
    pub fn reply(self, agent: &str, text: impl Into<String>) -> Self {
        self.push(agent, Ok(text.into()))
    }

    /// Queue a failure for `agent`.
    pub fn fail(self, agent: &str, error: AgentError) -> Self {
        self.push(agent, Err(error))
    }

    fn push(self, agent: &str, reply: Result<String, AgentError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(agent.to_string()).or_default().push_back(reply);
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made to one agent.
    pub fn calls_to(&self, agent: &str) -> usize {
        self.calls().iter().filter(|c| c.agent == agent).count()
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        agent_name: &str,
        prompt: &str,
        _timeout: Duration,
    ) -> Result<String, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                agent: agent_name.to_string(),
                prompt: prompt.to_string(),
            });
        }

        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.get_mut(agent_name).and_then(VecDeque::pop_front))
            .unwrap_or_else(|| {
                Err(AgentError::Execution {
                    agent: agent_name.to_string(),
                    reason: "no scripted reply left".into(),
                })
            })
    }
}
