//! End-to-end integration tests for triagent.
//!
//! These drive the full triage and investigation pipelines through the
//! public crates, with a scripted agent and an in-memory tracker standing in
//! for the external services.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use triagent_config::{AgentBackend, AppConfig};
use triagent_contracts::{RetryCoordinator, RetryPolicy};
use triagent_core::{AgentError, Issue, IssueState, Outcome, SourceType};
use triagent_memory::PatternStore;
use triagent_providers::{ScriptedInvoker, build_invoker};
use triagent_tracker::InMemoryTracker;
use triagent_workflow::triage::{SEVERITY_AGENT, VALIDITY_AGENT};
use triagent_workflow::{InvestigationSettings, InvestigationWorkflow, TriageWorkflow};

// ── Fixtures ─────────────────────────────────────────────────────────────

const VALID: &str = r#"{"is_valid": true, "is_actionable": true, "missing_context": ["app version"], "reasoning": "Clear reproduction steps"}"#;
const SEVERE: &str = r#"Severity below.
```json
{"severity": "P1", "complexity": "medium", "required_expertise": ["auth"], "reasoning": "Login blocked for SSO users"}
```"#;

fn login_issue() -> Issue {
    Issue {
        id: "uuid-42".into(),
        title: "SSO login loops".into(),
        description: Some("SSO login redirects back to the sign-in page forever".into()),
        state: Some(IssueState {
            name: "Todo".into(),
        }),
        ..Issue::default()
    }
}

fn tracker(writes: bool) -> Arc<InMemoryTracker> {
    Arc::new(
        InMemoryTracker::new()
            .with_issue("SP-42", login_issue())
            .with_writes(writes),
    )
}

fn coordinator(invoker: Arc<ScriptedInvoker>) -> RetryCoordinator {
    RetryCoordinator::new(invoker).with_policy(RetryPolicy::new(3, Duration::from_secs(5)))
}

fn investigation(
    tracker: Arc<InMemoryTracker>,
    store: Arc<PatternStore>,
    dir: &Path,
    max_similar: usize,
) -> InvestigationWorkflow {
    InvestigationWorkflow::new(
        tracker,
        store,
        InvestigationSettings {
            output_dir: dir.join("investigation_results"),
            max_similar,
            ..InvestigationSettings::default()
        },
    )
}

// ── Triage ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_triage_recovers_from_bad_output_and_updates_tracker() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = tracker(true);
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .reply(VALIDITY_AGENT, "I believe this ticket is valid.")
            .reply(VALIDITY_AGENT, VALID)
            .reply(SEVERITY_AGENT, SEVERE),
    );

    let workflow = TriageWorkflow::new(
        tracker.clone(),
        coordinator(invoker.clone()),
        dir.path().join("triage_results"),
        true,
    );
    let result = workflow.run("SP-42").await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(invoker.calls_to(VALIDITY_AGENT), 2);
    assert_eq!(invoker.calls_to(SEVERITY_AGENT), 1);
    assert!(invoker.calls()[1].prompt.contains("could not extract valid JSON"));

    let updates = tracker.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].priority, 2);
    assert_eq!(updates[0].comment, result.ai_comment);
    assert!(result.ai_comment.contains("app version"));

    let report =
        std::fs::read_to_string(dir.path().join("triage_results").join("SP-42.md")).unwrap();
    assert!(report.starts_with(&result.ai_comment));
    assert!(report.contains("_Linear writes: enabled_"));
}

#[tokio::test]
async fn e2e_triage_read_only_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = tracker(false);
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .reply(VALIDITY_AGENT, VALID)
            .reply(SEVERITY_AGENT, SEVERE),
    );

    let result = TriageWorkflow::new(tracker.clone(), coordinator(invoker), dir.path(), false)
        .run("SP-42")
        .await;

    assert!(result.success);
    assert!(tracker.updates().is_empty());
    let report = std::fs::read_to_string(dir.path().join("SP-42.md")).unwrap();
    assert!(report.contains("_Linear writes: disabled_"));
}

#[tokio::test]
async fn e2e_triage_reports_exhausted_agent() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = tracker(true);
    let crash = AgentError::Execution {
        agent: VALIDITY_AGENT.into(),
        reason: "exit code 1: rate limited".into(),
    };
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .fail(VALIDITY_AGENT, crash.clone())
            .fail(VALIDITY_AGENT, crash.clone())
            .fail(VALIDITY_AGENT, crash),
    );

    let result = TriageWorkflow::new(
        tracker.clone(),
        coordinator(invoker.clone()),
        dir.path(),
        true,
    )
    .run("SP-42")
    .await;

    assert!(!result.success);
    assert!(result.validity.is_none());
    assert_eq!(invoker.call_count(), 3);
    let error = result.error.unwrap();
    assert!(error.contains("after 3 attempt(s)"));
    assert!(error.contains("rate limited"));
    assert!(tracker.updates().is_empty());
    assert!(!dir.path().join("SP-42.md").exists());
}

// ── Investigation & pattern learning ─────────────────────────────────────

#[tokio::test]
async fn e2e_investigation_learns_from_recorded_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PatternStore::open(dir.path().join("data/patterns.jsonl")).unwrap());
    let tracker = tracker(true);

    // A neutral pattern starts at 0.5 and is below the 0.7 match threshold.
    let id = store
        .record_pattern("sso login", "Clear the stale IdP session cookie", vec![], None)
        .unwrap();
    let before = investigation(tracker.clone(), store.clone(), dir.path(), 0)
        .run("SP-42")
        .await;
    assert!(before.success);
    assert!(before.pattern_matches.is_empty());
    assert_eq!(
        before.recommendations[0].recommendation,
        "Conduct detailed technical investigation"
    );

    // 1/2, 2/3, 3/4: the third resolution lifts it over the threshold.
    for _ in 0..3 {
        assert!(store.update_outcome(&id, Outcome::Resolved).unwrap());
    }
    let after = investigation(tracker.clone(), store.clone(), dir.path(), 0)
        .run("SP-42")
        .await;
    assert!(after.success);
    assert_eq!(after.pattern_matches.len(), 1);
    assert_eq!(after.pattern_matches[0].pattern_id, id);
    assert_eq!(after.pattern_matches[0].confidence, 0.75);
    assert_eq!(after.pattern_matches[0].successful_resolutions, 3);

    let rec = &after.recommendations[0];
    assert_eq!(rec.recommendation, "Apply proven resolution pattern: sso login");
    assert_eq!(rec.citations[0].source_type(), SourceType::Pattern);

    let report = std::fs::read_to_string(
        dir.path().join("investigation_results").join("SP-42.md"),
    )
    .unwrap();
    assert!(report.contains("sso login"));
}

#[tokio::test]
async fn e2e_investigation_with_history_counts_every_citation() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PatternStore::open(dir.path().join("patterns.jsonl")).unwrap());
    store
        .record_pattern(
            "redirects back to the sign-in page",
            "Align the session cookie domain",
            vec![],
            Some(Outcome::Resolved),
        )
        .unwrap();

    let result = investigation(tracker(true), store.clone(), dir.path(), 50)
        .run("SP-42")
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.similar_issues_count, 1);
    assert_eq!(result.findings.len(), 2);
    assert_eq!(result.recommendations.len(), 2);
    let expected: usize = result.findings.iter().map(|f| f.citations.len()).sum::<usize>()
        + result
            .recommendations
            .iter()
            .map(|r| r.citations.len())
            .sum::<usize>();
    assert_eq!(result.citations_count, expected);

    // The high-confidence recommendation was recorded; the medium one was not.
    let patterns = store.all_patterns().unwrap();
    assert_eq!(patterns.len(), 2);
    assert!(patterns[1].issue_pattern.starts_with("Apply proven resolution pattern"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["similar_issues_count"], 1);
}

// ── Configuration ────────────────────────────────────────────────────────

#[test]
fn e2e_config_file_and_env_select_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[agents]
backend = "anthropic"
max_retries = 5

[patterns]
path = "learned/patterns.jsonl"
"#,
    )
    .unwrap();

    let mut config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.agents.backend, AgentBackend::Anthropic);
    assert!(build_invoker(&config.agents).is_err());

    config
        .apply_overrides(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-ant-e2e".into()),
            "LINEAR_ENABLE_WRITES" => Some("YES".into()),
            _ => None,
        })
        .unwrap();
    assert!(config.tracker.writes_enabled);
    assert_eq!(config.agents.max_retries, 5);
    assert_eq!(build_invoker(&config.agents).unwrap().name(), "anthropic");
}
