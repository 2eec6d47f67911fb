//! Triage workflow.
//!
//! 1. Fetch the ticket from the tracker
//! 2. `analysis-expert` judges validity
//! 3. `bug-hunter` assesses severity and complexity
//! 4. Render the AI comment and save it under the triage output dir
//! 5. Push priority and comment back to the tracker (a no-op when read-only)

use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use triagent_contracts::RetryCoordinator;
use triagent_core::{IssueTracker, SeverityAnalysis, TriageResult, ValidityAnalysis};

use crate::WorkflowError;
use crate::report::{format_ai_comment, save_report, triage_file_content};

pub const VALIDITY_AGENT: &str = "analysis-expert";
pub const SEVERITY_AGENT: &str = "bug-hunter";

pub struct TriageWorkflow {
    tracker: Arc<dyn IssueTracker>,
    coordinator: RetryCoordinator,
    output_dir: PathBuf,
    writes_enabled: bool,
}

/// Everything a successful run produces.
struct Analysis {
    validity: ValidityAnalysis,
    severity: SeverityAnalysis,
    comment: String,
}

impl TriageWorkflow {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        coordinator: RetryCoordinator,
        output_dir: impl Into<PathBuf>,
        writes_enabled: bool,
    ) -> Self {
        Self {
            tracker,
            coordinator,
            output_dir: output_dir.into(),
            writes_enabled,
        }
    }

    /// Triage one ticket. Failures come back as `success == false`.
    pub async fn run(&self, ticket_id: &str) -> TriageResult {
        let started = Instant::now();
        let ticket_url = self.tracker.issue_url(ticket_id);
        let mode = if self.writes_enabled { "WRITE" } else { "READ-ONLY" };
        info!(ticket_id, mode, "Starting triage");

        match self.analyze(ticket_id).await {
            Ok(analysis) => {
                let duration_secs = started.elapsed().as_secs_f64();
                info!(ticket_id, duration_secs, "Triage complete");
                TriageResult {
                    ticket_id: ticket_id.to_string(),
                    ticket_url,
                    validity: Some(analysis.validity),
                    severity: Some(analysis.severity),
                    ai_comment: analysis.comment,
                    success: true,
                    duration_secs,
                    agents_used: vec![VALIDITY_AGENT.into(), SEVERITY_AGENT.into()],
                    error: None,
                }
            }
            Err(e) => {
                error!(ticket_id, error = %e, "Triage failed");
                TriageResult {
                    ticket_id: ticket_id.to_string(),
                    ticket_url,
                    validity: None,
                    severity: None,
                    ai_comment: String::new(),
                    success: false,
                    duration_secs: started.elapsed().as_secs_f64(),
                    agents_used: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn analyze(&self, ticket_id: &str) -> Result<Analysis, WorkflowError> {
        let ticket = self.tracker.fetch_issue(ticket_id).await?;
        let data = json!({ "ticket": ticket });

        info!(ticket_id, agent = VALIDITY_AGENT, "Analyzing validity");
        let validity: ValidityAnalysis = self
            .coordinator
            .call_with_retry(VALIDITY_AGENT, "Analyze ticket validity", &data)
            .await?;

        info!(ticket_id, agent = SEVERITY_AGENT, "Assessing severity");
        let severity: SeverityAnalysis = self
            .coordinator
            .call_with_retry(SEVERITY_AGENT, "Assess severity and priority", &data)
            .await?;

        let comment = format_ai_comment(&validity, &severity);
        save_report(
            &self.output_dir,
            ticket_id,
            &triage_file_content(&comment, self.writes_enabled, Utc::now()),
        )?;

        self.tracker
            .update_issue(ticket_id, severity.severity.tracker_priority(), &comment)
            .await?;

        Ok(Analysis {
            validity,
            severity,
            comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use triagent_contracts::RetryPolicy;
    use triagent_core::{AgentError, Issue, Severity};
    use triagent_providers::ScriptedInvoker;
    use triagent_tracker::InMemoryTracker;

    const VALID: &str = r#"{"is_valid": true, "is_actionable": true, "missing_context": [], "reasoning": "Steps to reproduce are clear"}"#;
    const SEVERE: &str = "Assessment:\n```json\n{\"severity\": \"P0\", \"complexity\": \"complex\", \"required_expertise\": [\"payments\"], \"reasoning\": \"All checkouts fail\"}\n```";

    fn tracker() -> Arc<InMemoryTracker> {
        Arc::new(InMemoryTracker::new().with_issue(
            "SP-1",
            Issue {
                id: "uuid-1".into(),
                title: "Checkout broken".into(),
                description: Some("Every payment returns 500".into()),
                ..Issue::default()
            },
        ))
    }

    fn workflow(
        tracker: Arc<InMemoryTracker>,
        invoker: Arc<ScriptedInvoker>,
        dir: &std::path::Path,
    ) -> TriageWorkflow {
        let coordinator = RetryCoordinator::new(invoker)
            .with_policy(RetryPolicy::new(2, Duration::from_secs(5)));
        TriageWorkflow::new(tracker, coordinator, dir, true)
    }

    #[tokio::test]
    async fn successful_triage_updates_tracker_and_saves_report() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker();
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply(VALIDITY_AGENT, VALID)
                .reply(SEVERITY_AGENT, SEVERE),
        );
        let result = workflow(tracker.clone(), invoker.clone(), dir.path())
            .run("SP-1")
            .await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.ticket_url, "https://linear.app/issue/SP-1");
        assert_eq!(result.severity.as_ref().unwrap().severity, Severity::P0);
        assert_eq!(result.agents_used, vec![VALIDITY_AGENT, SEVERITY_AGENT]);

        let updates = tracker.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].priority, 1);
        assert_eq!(updates[0].comment, result.ai_comment);

        let saved = std::fs::read_to_string(dir.path().join("SP-1.md")).unwrap();
        assert!(saved.starts_with("## AI Triage Analysis"));
        assert!(saved.contains("_Linear writes: enabled_"));

        let calls = invoker.calls();
        assert!(calls[0].prompt.contains("Checkout broken"));
    }

    #[tokio::test]
    async fn invalid_agent_output_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply(VALIDITY_AGENT, "Looks valid to me!")
                .reply(VALIDITY_AGENT, VALID)
                .reply(SEVERITY_AGENT, SEVERE),
        );
        let result = workflow(tracker(), invoker.clone(), dir.path()).run("SP-1").await;
        assert!(result.success);
        assert_eq!(invoker.calls_to(VALIDITY_AGENT), 2);
    }

    #[tokio::test]
    async fn exhausted_agent_yields_failed_result() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker();
        let failure = AgentError::Execution {
            agent: SEVERITY_AGENT.into(),
            reason: "exit code 1".into(),
        };
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply(VALIDITY_AGENT, VALID)
                .fail(SEVERITY_AGENT, failure.clone())
                .fail(SEVERITY_AGENT, failure),
        );
        let result = workflow(tracker.clone(), invoker, dir.path()).run("SP-1").await;

        assert!(!result.success);
        assert!(result.validity.is_none());
        assert!(result.agents_used.is_empty());
        assert!(result.error.unwrap().contains("after 2 attempt(s)"));
        assert!(tracker.updates().is_empty());
        assert!(!dir.path().join("SP-1.md").exists());
    }

    #[tokio::test]
    async fn unknown_ticket_fails_without_calling_agents() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = Arc::new(ScriptedInvoker::new());
        let result = workflow(tracker(), invoker.clone(), dir.path()).run("SP-404").await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("SP-404"));
        assert_eq!(invoker.call_count(), 0);
    }
}
