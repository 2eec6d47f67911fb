//! Retry coordinator: agent call → extract → validate, with bounded retries.
//!
//! Each attempt is a fresh agent invocation. When an attempt fails (agent
//! error, timeout, no JSON, schema violation) the error text is prepended to
//! the next prompt so the agent can correct itself. Attempts run strictly one
//! after another and the bound is hard.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use triagent_core::{AgentError, AgentInvoker};

use crate::extract::extract;
use crate::prompt::{build_prompt, with_feedback};
use crate::schema::{Schema, StructuredOutput};
use crate::validate::validate_against;
use crate::{AttemptError, RetryError, ValidationError};

/// Default number of attempts per call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Attempt bound, per-attempt timeout and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// `max_retries` is the total number of attempts; zero is raised to one.
    pub fn new(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            timeout,
            backoff: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT)
    }
}

/// Obtains validated records from an unreliable agent.
#[derive(Clone)]
pub struct RetryCoordinator {
    invoker: Arc<dyn AgentInvoker>,
    policy: RetryPolicy,
}

impl RetryCoordinator {
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self {
            invoker,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Ask `agent_name` to perform `task` over `data` and return a `T`.
    pub async fn call_with_retry<T: StructuredOutput>(
        &self,
        agent_name: &str,
        task: &str,
        data: &Value,
    ) -> Result<T, RetryError> {
        let schema = T::schema();
        self.run(agent_name, task, data, &schema, |cleaned| {
            serde_json::from_value::<T>(cleaned).map_err(|e| {
                AttemptError::Validation(ValidationError::single(&schema.name, "$", e.to_string()))
            })
        })
        .await
    }

    /// Same as [`call_with_retry`](Self::call_with_retry) for a schema
    /// declared at runtime; returns the validated JSON value.
    pub async fn call_with_schema(
        &self,
        agent_name: &str,
        task: &str,
        data: &Value,
        schema: &Schema,
    ) -> Result<Value, RetryError> {
        self.run(agent_name, task, data, schema, Ok).await
    }

    async fn run<T>(
        &self,
        agent_name: &str,
        task: &str,
        data: &Value,
        schema: &Schema,
        convert: impl Fn(Value) -> Result<T, AttemptError>,
    ) -> Result<T, RetryError> {
        let base_prompt = build_prompt(task, schema, data);
        let max = self.policy.max_retries;
        let mut last_error: Option<AttemptError> = None;

        for attempt in 1..=max {
            let prompt = match &last_error {
                Some(e) => with_feedback(&base_prompt, &e.to_string()),
                None => base_prompt.clone(),
            };

            info!(
                agent = %agent_name,
                backend = %self.invoker.name(),
                attempt,
                max,
                "Invoking agent"
            );

            match self.attempt(agent_name, &prompt, schema).await.and_then(&convert) {
                Ok(result) => {
                    debug!(agent = %agent_name, attempt, "Agent produced a valid result");
                    return Ok(result);
                }
                Err(e) => {
                    warn!(agent = %agent_name, attempt, max, error = %e, "Attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < max && !self.policy.backoff.is_zero() {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        Err(RetryError::Exhausted {
            agent: agent_name.to_string(),
            attempts: max,
            last: Box::new(last_error.unwrap_or_else(|| {
                AttemptError::Agent(AgentError::NotConfigured("no attempts were made".into()))
            })),
        })
    }

    async fn attempt(
        &self,
        agent_name: &str,
        prompt: &str,
        schema: &Schema,
    ) -> Result<Value, AttemptError> {
        let timeout = self.policy.timeout;
        let raw = match tokio::time::timeout(
            timeout,
            self.invoker.invoke(agent_name, prompt, timeout),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AttemptError::Agent(AgentError::Timeout {
                    agent: agent_name.to_string(),
                    timeout_secs: timeout.as_secs(),
                }));
            }
        };

        let candidate = extract(&raw)?;
        Ok(validate_against(&candidate, schema)?)
    }
}
