//! History research: similar issues, their citations, and how they were resolved.

use triagent_core::{Citation, EmptyCitationField, Issue, SimilarIssue, SourceType};

/// Characters kept from titles, descriptions and excerpts.
const SNIPPET_CHARS: usize = 200;
/// A description's first sentence is quoted only when shorter than this.
const MAX_SENTENCE_CHARS: usize = 150;

/// Terminal states that count as a resolution.
const RESOLVED_STATES: [&str; 3] = ["completed", "done", "closed"];

/// A resolution state shared by several similar issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPattern {
    pub pattern: String,
    pub count: usize,
    pub example_issue_id: String,
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Summarize a fetched issue as a [`SimilarIssue`].
pub fn similar_from_issue(issue_id: &str, issue: &Issue, url: String) -> SimilarIssue {
    SimilarIssue {
        id: issue_id.to_string(),
        url,
        title: truncate(&issue.title, SNIPPET_CHARS),
        description: truncate(issue.description_text(), SNIPPET_CHARS),
        state: issue.state_name().to_string(),
        labels: String::new(),
    }
}

/// Cite a similar issue: its title, plus the first sentence of its
/// description when that sentence is short.
pub fn citation_from_issue(issue: &SimilarIssue) -> Result<Citation, EmptyCitationField> {
    let mut excerpt = issue.title.clone();
    let first_sentence = issue.description.split('.').next().unwrap_or("");
    let len = first_sentence.chars().count();
    if len > 0 && len < MAX_SENTENCE_CHARS {
        if excerpt.is_empty() {
            excerpt = first_sentence.to_string();
        } else {
            excerpt = format!("{excerpt}: {first_sentence}");
        }
    }
    Citation::new(
        SourceType::Issue,
        &issue.id,
        &issue.url,
        truncate(&excerpt, SNIPPET_CHARS),
    )
}

/// Group resolved issues by terminal state, most common first.
pub fn resolution_patterns(similar: &[SimilarIssue]) -> Vec<ResolutionPattern> {
    let mut patterns: Vec<ResolutionPattern> = Vec::new();
    for issue in similar {
        let state = issue.state.to_lowercase();
        if !RESOLVED_STATES.contains(&state.as_str()) {
            continue;
        }
        let key = format!("Resolved with state: {state}");
        match patterns.iter_mut().find(|p| p.pattern == key) {
            Some(existing) => existing.count += 1,
            None => patterns.push(ResolutionPattern {
                pattern: key,
                count: 1,
                example_issue_id: issue.id.clone(),
            }),
        }
    }
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use triagent_core::IssueState;

    fn similar(id: &str, state: &str) -> SimilarIssue {
        SimilarIssue {
            id: id.into(),
            url: format!("https://linear.app/issue/{id}"),
            title: "Checkout fails".into(),
            description: "Payment form spins forever. Happens on Safari only.".into(),
            state: state.into(),
            labels: String::new(),
        }
    }

    #[test]
    fn similar_issue_truncates_long_text() {
        let issue = Issue {
            id: "uuid-1".into(),
            title: "t".repeat(300),
            description: Some("d".repeat(250)),
            state: Some(IssueState {
                name: "In Progress".into(),
            }),
            ..Issue::default()
        };
        let s = similar_from_issue("SP-1", &issue, "https://linear.app/issue/SP-1".into());
        assert_eq!(s.id, "SP-1");
        assert_eq!(s.title.len(), 200);
        assert_eq!(s.description.len(), 200);
        assert_eq!(s.state, "In Progress");
    }

    #[test]
    fn missing_state_is_unknown() {
        let s = similar_from_issue("SP-2", &Issue::default(), "u".into());
        assert_eq!(s.state, "unknown");
        assert_eq!(s.description, "");
    }

    #[test]
    fn citation_quotes_short_first_sentence() {
        let c = citation_from_issue(&similar("SP-3", "done")).unwrap();
        assert_eq!(c.source_type(), SourceType::Issue);
        assert_eq!(c.excerpt(), "Checkout fails: Payment form spins forever");
        assert_eq!(c.source_url(), "https://linear.app/issue/SP-3");
    }

    #[test]
    fn citation_skips_long_first_sentence() {
        let mut issue = similar("SP-4", "done");
        issue.description = "x".repeat(180);
        let c = citation_from_issue(&issue).unwrap();
        assert_eq!(c.excerpt(), "Checkout fails");
    }

    #[test]
    fn resolution_patterns_count_terminal_states() {
        let issues = vec![
            similar("A", "done"),
            similar("B", "In Progress"),
            similar("C", "closed"),
            similar("D", "Done"),
        ];
        let patterns = resolution_patterns(&issues);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern, "Resolved with state: done");
        assert_eq!(patterns[0].count, 2);
        assert_eq!(patterns[0].example_issue_id, "A");
        assert_eq!(patterns[1].count, 1);
    }
}
