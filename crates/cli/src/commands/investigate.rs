//! `triagent investigate`: Research an issue against history and patterns.

use std::sync::Arc;
use triagent_config::AppConfig;
use triagent_core::InvestigationResult;
use triagent_workflow::{InvestigationSettings, InvestigationWorkflow};
use triagent_workflow::investigation::DEFAULT_MAX_SIMILAR;

use super::CmdResult;

pub async fn run(config: &AppConfig, issue_id: &str) -> CmdResult {
    println!("🔎 Investigating {issue_id}");
    println!();

    let settings = InvestigationSettings {
        output_dir: config.output.investigation_dir.clone(),
        min_confidence: config.patterns.min_confidence,
        record_threshold: config.patterns.record_threshold,
        max_similar: DEFAULT_MAX_SIMILAR,
    };
    let workflow = InvestigationWorkflow::new(
        super::tracker(config),
        Arc::new(super::pattern_store(config)?),
        settings,
    );
    let result = workflow.run(issue_id).await;
    print_summary(&result);

    match result.error {
        None if result.success => Ok(()),
        error => Err(format!(
            "Investigation failed: {}",
            error.unwrap_or_else(|| "unknown error".into())
        )
        .into()),
    }
}

fn print_summary(result: &InvestigationResult) {
    if !result.success {
        println!("   ❌ Investigation failed for {}", result.issue_id);
        return;
    }

    println!("   ✅ Investigation complete in {:.1}s", result.duration_secs);
    println!("   Similar issues:  {}", result.similar_issues_count);
    println!("   Pattern matches: {}", result.pattern_matches.len());
    println!("   Citations:       {}", result.citations_count);

    println!();
    println!("   Findings:");
    for finding in &result.findings {
        println!("   - [{}] {}", finding.confidence, finding.finding);
    }
    println!("   Recommendations:");
    for rec in &result.recommendations {
        println!("   - [{}] {}", rec.confidence, rec.recommendation);
    }
}
