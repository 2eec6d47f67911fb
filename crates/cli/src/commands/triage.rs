//! `triagent triage`: Analyze a ticket and update the tracker.

use triagent_config::AppConfig;
use triagent_core::TriageResult;
use triagent_workflow::TriageWorkflow;

use super::CmdResult;

pub async fn run(config: &AppConfig, ticket_id: &str) -> CmdResult {
    println!("🎫 Triaging {ticket_id}");
    println!("   Linear mode: {}", config.tracker.write_mode());
    println!();

    let workflow = TriageWorkflow::new(
        super::tracker(config),
        super::coordinator(config)?,
        &config.output.triage_dir,
        config.tracker.writes_enabled,
    );
    let result = workflow.run(ticket_id).await;
    print_summary(&result);

    match result.error {
        None if result.success => Ok(()),
        error => Err(format!(
            "Triage failed: {}",
            error.unwrap_or_else(|| "unknown error".into())
        )
        .into()),
    }
}

fn print_summary(result: &TriageResult) {
    if !result.success {
        println!("   ❌ Triage failed for {}", result.ticket_id);
        return;
    }

    println!("   ✅ Triage complete in {:.1}s", result.duration_secs);
    if let Some(validity) = &result.validity {
        println!(
            "   Valid:      {} (actionable: {})",
            validity.is_valid, validity.is_actionable
        );
    }
    if let Some(severity) = &result.severity {
        println!("   Severity:   {}", severity.severity);
        println!("   Complexity: {}", severity.complexity.label());
    }
    println!("   Agents:     {}", result.agents_used.join(", "));
    println!("   Ticket:     {}", result.ticket_url);
}
