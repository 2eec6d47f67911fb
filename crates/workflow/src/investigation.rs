//! Investigation workflow.
//!
//! 1. Fetch the issue and look up similar issues in the tracker
//! 2. Match the description against learned patterns
//! 3. Synthesize cited findings and recommendations from that history
//! 4. Record confident recommendations back into the pattern store
//! 5. Render and save the markdown report

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use triagent_core::{
    Citation, ConfidenceLevel, Finding, InvestigationResult, Issue, IssueTracker, PatternMatch,
    Recommendation, SimilarIssue, SourceType,
};
use triagent_memory::PatternStore;
use triagent_tracker::{citation_from_issue, resolution_patterns};

use crate::WorkflowError;
use crate::citations::CitationTracker;
use crate::report::{render_investigation, save_report};

/// Default cap on similar issues pulled from the tracker.
pub const DEFAULT_MAX_SIMILAR: usize = 50;

#[derive(Debug, Clone)]
pub struct InvestigationSettings {
    pub output_dir: PathBuf,
    /// Lowest pattern confidence treated as a match
    pub min_confidence: f64,
    /// Lowest recommendation confidence score recorded as a new pattern
    pub record_threshold: f64,
    pub max_similar: usize,
}

impl Default for InvestigationSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("investigation_results"),
            min_confidence: 0.7,
            record_threshold: 0.7,
            max_similar: DEFAULT_MAX_SIMILAR,
        }
    }
}

pub struct InvestigationWorkflow {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<PatternStore>,
    settings: InvestigationSettings,
}

impl InvestigationWorkflow {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        store: Arc<PatternStore>,
        settings: InvestigationSettings,
    ) -> Self {
        Self {
            tracker,
            store,
            settings,
        }
    }

    /// Investigate one issue. Failures come back as `success == false`.
    pub async fn run(&self, issue_id: &str) -> InvestigationResult {
        let started = Instant::now();
        let issue_url = self.tracker.issue_url(issue_id);
        info!(issue_id, "Starting investigation");

        match self.investigate(issue_id, &issue_url, started).await {
            Ok(result) => {
                info!(
                    issue_id,
                    duration_secs = result.duration_secs,
                    findings = result.findings.len(),
                    recommendations = result.recommendations.len(),
                    "Investigation complete"
                );
                result
            }
            Err(e) => {
                error!(issue_id, error = %e, "Investigation failed");
                InvestigationResult {
                    issue_id: issue_id.to_string(),
                    issue_url,
                    findings: Vec::new(),
                    recommendations: Vec::new(),
                    pattern_matches: Vec::new(),
                    success: false,
                    duration_secs: started.elapsed().as_secs_f64(),
                    agents_used: Vec::new(),
                    similar_issues_count: 0,
                    citations_count: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn investigate(
        &self,
        issue_id: &str,
        issue_url: &str,
        started: Instant,
    ) -> Result<InvestigationResult, WorkflowError> {
        let issue = self.tracker.fetch_issue(issue_id).await?;

        info!(issue_id, "Researching similar issues");
        let similar = self
            .tracker
            .find_similar_issues(issue_id, self.settings.max_similar)
            .await?;

        // An empty query would match every pattern; fall back to the title.
        let query = match issue.description_text().trim() {
            "" => issue.title.as_str(),
            description => description,
        };
        let pattern_matches = self
            .store
            .find_matching_patterns(query, self.settings.min_confidence)?;
        info!(
            issue_id,
            similar = similar.len(),
            patterns = pattern_matches.len(),
            "History gathered"
        );

        let evidence = Evidence {
            issue_id,
            issue_url,
            issue: &issue,
            similar: &similar,
            top_pattern: pattern_matches.first(),
        };
        let findings = evidence.findings()?;
        let recommendations = evidence.recommendations(&findings)?;

        let mut tracker = CitationTracker::new();
        for finding in &findings {
            if let Err(message) = CitationTracker::validate_finding(finding) {
                warn!(issue_id, %message, "Uncited finding");
            }
            tracker.extend(&finding.citations);
        }
        for rec in &recommendations {
            if let Err(message) = CitationTracker::validate_recommendation(rec) {
                warn!(issue_id, %message, "Uncited recommendation");
            }
            tracker.extend(&rec.citations);
        }

        self.record_patterns(&recommendations)?;

        let result = InvestigationResult {
            issue_id: issue_id.to_string(),
            issue_url: issue_url.to_string(),
            findings,
            recommendations,
            pattern_matches,
            success: true,
            duration_secs: started.elapsed().as_secs_f64(),
            agents_used: Vec::new(),
            similar_issues_count: similar.len(),
            citations_count: tracker.total(),
            error: None,
        };

        save_report(
            &self.settings.output_dir,
            issue_id,
            &render_investigation(&result),
        )?;
        Ok(result)
    }

    fn record_patterns(&self, recommendations: &[Recommendation]) -> Result<(), WorkflowError> {
        for rec in recommendations
            .iter()
            .filter(|r| r.confidence.score() >= self.settings.record_threshold)
        {
            self.store.record_pattern(
                &rec.recommendation,
                &rec.reasoning,
                rec.citations.clone(),
                None,
            )?;
        }
        Ok(())
    }
}

/// What the tracker and pattern store told us about one issue.
struct Evidence<'a> {
    issue_id: &'a str,
    issue_url: &'a str,
    issue: &'a Issue,
    similar: &'a [SimilarIssue],
    top_pattern: Option<&'a PatternMatch>,
}

impl Evidence<'_> {
    fn issue_citation(&self, excerpt: &str) -> Result<Citation, WorkflowError> {
        Ok(Citation::new(
            SourceType::Issue,
            self.issue_id,
            self.issue_url,
            excerpt,
        )?)
    }

    fn pattern_citation(
        pattern: &PatternMatch,
        excerpt: String,
    ) -> Result<Citation, WorkflowError> {
        Ok(Citation::new(
            SourceType::Pattern,
            &pattern.pattern_id,
            format!("pattern://{}", pattern.pattern_id),
            excerpt,
        )?)
    }

    fn findings(&self) -> Result<Vec<Finding>, WorkflowError> {
        let mut findings = Vec::new();

        if let Some(first) = self.similar.first() {
            let resolved: usize = resolution_patterns(self.similar).iter().map(|p| p.count).sum();
            let mut text = format!("Found {} similar historical issues", self.similar.len());
            if resolved > 0 {
                text.push_str(&format!(", {resolved} of which were successfully resolved"));
            }
            text.push_str(". Review these for potential solutions.");

            let citation = match citation_from_issue(first) {
                Ok(c) => c,
                Err(_) => Citation::new(SourceType::Issue, &first.id, &first.url, "Similar issue")?,
            };
            findings.push(Finding {
                finding: text,
                confidence: ConfidenceLevel::High,
                citations: vec![citation],
            });
        }

        if let Some(pattern) = self.top_pattern {
            findings.push(Finding {
                finding: format!("Historical pattern identified: {}", pattern.description),
                confidence: ConfidenceLevel::from_pattern_confidence(pattern.confidence),
                citations: vec![Self::pattern_citation(
                    pattern,
                    format!(
                        "Pattern: {} (confidence: {:.2})",
                        pattern.description, pattern.confidence
                    ),
                )?],
            });
        }

        if findings.is_empty() {
            let excerpt = if self.issue.title.trim().is_empty() {
                "Current issue"
            } else {
                self.issue.title.as_str()
            };
            findings.push(Finding {
                finding: "No similar historical issues found. This appears to be a new issue type."
                    .into(),
                confidence: ConfidenceLevel::Medium,
                citations: vec![self.issue_citation(excerpt)?],
            });
        }

        Ok(findings)
    }

    fn recommendations(&self, findings: &[Finding]) -> Result<Vec<Recommendation>, WorkflowError> {
        let mut recommendations = Vec::new();

        if let Some(pattern) = self.top_pattern {
            let n = pattern.successful_resolutions;
            recommendations.push(Recommendation {
                recommendation: format!("Apply proven resolution pattern: {}", pattern.description),
                reasoning: format!("This approach has been successful in {n} similar cases"),
                confidence: ConfidenceLevel::from_pattern_confidence(pattern.confidence),
                citations: vec![Self::pattern_citation(
                    pattern,
                    format!("Pattern successfully applied {n} times: {}", pattern.description),
                )?],
            });
        }

        // The similar-issues finding, when present, is always first.
        if !self.similar.is_empty()
            && let Some(citation) = findings.first().and_then(|f| f.citations.first())
        {
            recommendations.push(Recommendation {
                recommendation: "Review similar resolved issues for solution patterns".into(),
                reasoning: "Historical data shows this issue type has known solutions".into(),
                confidence: ConfidenceLevel::Medium,
                citations: vec![citation.clone()],
            });
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation {
                recommendation: "Conduct detailed technical investigation".into(),
                reasoning: "No historical precedent found - requires manual analysis".into(),
                confidence: ConfidenceLevel::Medium,
                citations: vec![
                    self.issue_citation("Standard investigation recommended for new issue types")?,
                ],
            });
        }

        Ok(recommendations)
    }
}
