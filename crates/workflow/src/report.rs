//! Markdown rendering and on-disk reports.
//!
//! Reports are written to `<dir>/<id>.md`, overwriting any earlier run for
//! the same ticket.

use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use triagent_core::{InvestigationResult, SeverityAnalysis, ValidityAnalysis};

use crate::citations::CitationTracker;

/// The triage comment posted to the tracker and saved to disk.
pub fn format_ai_comment(validity: &ValidityAnalysis, severity: &SeverityAnalysis) -> String {
    let missing_context = if validity.missing_context.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = validity
            .missing_context
            .iter()
            .map(|item| format!("- {item}"))
            .collect();
        format!("\n#### Missing Context\n{}\n", items.join("\n"))
    };
    let expertise = if severity.required_expertise.is_empty() {
        "None".to_string()
    } else {
        severity.required_expertise.join(", ")
    };

    format!(
        "## AI Triage Analysis\n\n\
         **Validity**: {}, {}\n\
         **Severity**: {}\n\
         **Complexity**: {}\n\
         **Required Expertise**: {expertise}\n\n\
         ### Validity Analysis\n\
         {}\n\
         {missing_context}\n\
         ### Severity Assessment\n\
         {}\n\n\
         ---\n\
         *Generated by triagent*\n",
        if validity.is_valid { "Valid" } else { "Invalid" },
        if validity.is_actionable { "Actionable" } else { "Not Actionable" },
        severity.severity,
        severity.complexity.label(),
        validity.reasoning,
        severity.reasoning,
    )
}

/// Triage comment plus a footer recording when it was made and whether the
/// tracker was written to.
pub fn triage_file_content(comment: &str, writes_enabled: bool, at: DateTime<Utc>) -> String {
    format!(
        "{comment}\n\n---\n_Analysis generated: {}_\n_Linear writes: {}_\n",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
        if writes_enabled { "enabled" } else { "disabled" }
    )
}

pub fn render_investigation(result: &InvestigationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Investigation: {}\n", result.issue_id);
    let _ = writeln!(out, "**Issue**: [{}]({})\n", result.issue_id, result.issue_url);
    out.push_str("\n### Research Sources\n- Issue tracker history\n- Pattern store\n");

    out.push_str("\n### Findings\n");
    if result.findings.is_empty() {
        out.push_str("*No findings generated*\n");
    }
    for finding in &result.findings {
        let _ = writeln!(out, "- {} (confidence: {})", finding.finding, finding.confidence);
        let _ = writeln!(
            out,
            "  {}",
            CitationTracker::format_citations_list(&finding.citations)
        );
    }

    out.push_str("\n### Recommendations\n");
    if result.recommendations.is_empty() {
        out.push_str("*No recommendations generated*\n");
    }
    for rec in &result.recommendations {
        let _ = writeln!(out, "- **{}** (confidence: {})", rec.recommendation, rec.confidence);
        let _ = writeln!(out, "  - Rationale: {}", rec.reasoning);
        let _ = writeln!(
            out,
            "  {}",
            CitationTracker::format_citations_list(&rec.citations)
        );
    }

    out.push_str("\n### Pattern Matches\n");
    if result.pattern_matches.is_empty() {
        out.push_str("*No pattern matches found*\n");
    }
    for m in &result.pattern_matches {
        let _ = writeln!(out, "- {} (`{}`)", m.description, m.pattern_id);
        let _ = writeln!(out, "  Confidence: {:.2}", m.confidence);
        let _ = writeln!(out, "  Successful resolutions: {}", m.successful_resolutions);
    }

    let _ = write!(
        out,
        "\n---\n*Generated by triagent investigation*\n\
         *Duration: {:.2}s | Citations: {} | Patterns: {}*\n",
        result.duration_secs,
        result.citations_count,
        result.pattern_matches.len()
    );
    out
}

/// Write `content` to `<dir>/<id>.md`, creating `dir` if needed.
pub fn save_report(dir: &Path, id: &str, content: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.md", file_stem(id)));
    fs::write(&path, content)?;
    info!(path = %path.display(), "Saved report");
    Ok(path)
}

/// Ticket ids come from the command line; keep them inside the output dir.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
