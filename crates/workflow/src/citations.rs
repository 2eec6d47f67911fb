//! Citation bookkeeping and markdown formatting.

use triagent_core::{Citation, Finding, Recommendation};

/// Characters of a finding or recommendation quoted in error messages.
const QUOTE_CHARS: usize = 50;

fn quote(text: &str) -> String {
    let mut quoted: String = text.chars().take(QUOTE_CHARS).collect();
    if text.chars().count() > QUOTE_CHARS {
        quoted.push_str("...");
    }
    quoted
}

/// Collects the citations gathered during a run and renders them.
#[derive(Debug, Default)]
pub struct CitationTracker {
    citations: Vec<Citation>,
}

impl CitationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, citation: Citation) {
        self.citations.push(citation);
    }

    pub fn extend<'a>(&mut self, citations: impl IntoIterator<Item = &'a Citation>) {
        self.citations.extend(citations.into_iter().cloned());
    }

    pub fn total(&self) -> usize {
        self.citations.len()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Err with a readable message when the finding cites nothing.
    pub fn validate_finding(finding: &Finding) -> Result<(), String> {
        if finding.citations.is_empty() {
            return Err(format!(
                "Finding '{}' has no citations (required: ≥1)",
                quote(&finding.finding)
            ));
        }
        Ok(())
    }

    /// Err with a readable message when the recommendation cites nothing.
    pub fn validate_recommendation(recommendation: &Recommendation) -> Result<(), String> {
        if recommendation.citations.is_empty() {
            return Err(format!(
                "Recommendation '{}' has no citations (required: ≥1)",
                quote(&recommendation.recommendation)
            ));
        }
        Ok(())
    }

    /// `- [type: id](url): "excerpt"`
    pub fn format_citation(citation: &Citation) -> String {
        format!(
            "- [{}: {}]({}): \"{}\"",
            citation.source_type(),
            citation.source_id(),
            citation.source_url(),
            citation.excerpt()
        )
    }

    pub fn format_citations_list(citations: &[Citation]) -> String {
        if citations.is_empty() {
            return "(No citations)".into();
        }
        let mut lines = vec!["**Supporting Evidence:**".to_string()];
        lines.extend(citations.iter().map(Self::format_citation));
        lines.join("\n")
    }
}
