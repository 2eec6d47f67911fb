//! Learned resolution patterns and their confidence bookkeeping.
//!
//! A [`Pattern`] is one line of the pattern log. Its confidence is always the
//! observed success rate `successful_resolutions / total_uses`; the only way
//! to change the counters is [`Pattern::apply_outcome`].

use crate::citation::Citation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an issue that used a pattern turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Resolved,
    NotResolved,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Resolved => "resolved",
            Outcome::NotResolved => "not_resolved",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resolved" => Ok(Outcome::Resolved),
            "not_resolved" | "not-resolved" | "unresolved" => Ok(Outcome::NotResolved),
            other => Err(format!(
                "unknown outcome '{other}' (expected 'resolved' or 'not_resolved')"
            )),
        }
    }
}

/// A persisted issue-resolution pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_id: String,
    pub issue_pattern: String,
    pub recommendation: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub outcome: Option<Outcome>,
    pub successful_resolutions: u64,
    pub total_uses: u64,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pattern {
    /// Build a freshly recorded pattern.
    ///
    /// A pattern recorded as resolved starts at full confidence; anything
    /// else starts neutral at 0.5 with no successes.
    pub fn new(
        pattern_id: impl Into<String>,
        issue_pattern: impl Into<String>,
        recommendation: impl Into<String>,
        citations: Vec<Citation>,
        outcome: Option<Outcome>,
        now: DateTime<Utc>,
    ) -> Self {
        let resolved = outcome == Some(Outcome::Resolved);
        Self {
            pattern_id: pattern_id.into(),
            issue_pattern: issue_pattern.into(),
            recommendation: recommendation.into(),
            citations,
            outcome,
            successful_resolutions: u64::from(resolved),
            total_uses: 1,
            confidence: if resolved { 1.0 } else { 0.5 },
            created_at: now,
            updated_at: now,
        }
    }

    /// Record one more use of this pattern and recompute confidence.
    pub fn apply_outcome(&mut self, outcome: Outcome, now: DateTime<Utc>) {
        self.outcome = Some(outcome);
        self.total_uses += 1;
        if outcome == Outcome::Resolved {
            self.successful_resolutions += 1;
        }
        self.confidence = self.successful_resolutions as f64 / self.total_uses as f64;
        self.updated_at = now;
    }

    /// Case-insensitive, bidirectional substring match against an issue description.
    pub fn matches(&self, issue_description: &str) -> bool {
        let description = issue_description.to_lowercase();
        let pattern = self.issue_pattern.to_lowercase();
        description.contains(&pattern) || pattern.contains(&description)
    }

    /// Read-only projection handed to callers.
    pub fn to_match(&self) -> PatternMatch {
        PatternMatch {
            pattern_id: self.pattern_id.clone(),
            description: self.issue_pattern.clone(),
            confidence: self.confidence,
            successful_resolutions: self.successful_resolutions,
            citations: self.citations.clone(),
        }
    }
}

/// A pattern returned from a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    pub description: String,
    pub confidence: f64,
    pub successful_resolutions: u64,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(outcome: Option<Outcome>) -> Pattern {
        Pattern::new("P-1", "Database timeout", "Raise pool size", vec![], outcome, Utc::now())
    }

    #[test]
    fn unresolved_pattern_starts_neutral() {
        let p = pattern(None);
        assert_eq!(p.successful_resolutions, 0);
        assert_eq!(p.total_uses, 1);
        assert_eq!(p.confidence, 0.5);
    }

    #[test]
    fn resolved_pattern_starts_confident() {
        let p = pattern(Some(Outcome::Resolved));
        assert_eq!(p.successful_resolutions, 1);
        assert_eq!(p.confidence, 1.0);
    }

    #[test]
    fn apply_outcome_tracks_success_rate() {
        let mut p = pattern(Some(Outcome::Resolved));
        p.apply_outcome(Outcome::NotResolved, Utc::now());
        assert_eq!((p.successful_resolutions, p.total_uses), (1, 2));
        assert_eq!(p.confidence, 0.5);

        p.apply_outcome(Outcome::Resolved, Utc::now());
        assert_eq!((p.successful_resolutions, p.total_uses), (2, 3));
        assert_eq!(p.confidence, 2.0 / 3.0);
        assert_eq!(p.outcome, Some(Outcome::Resolved));
    }

    #[test]
    fn neutral_start_is_replaced_by_observed_rate() {
        let mut p = pattern(None);
        p.apply_outcome(Outcome::NotResolved, Utc::now());
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn matching_is_bidirectional_and_case_insensitive() {
        let p = pattern(None);
        assert!(p.matches("Seeing DATABASE TIMEOUT errors in prod"));
        assert!(p.matches("database"));
        assert!(!p.matches("memory leak"));
    }

    #[test]
    fn outcome_parses_cli_spellings() {
        assert_eq!("resolved".parse::<Outcome>().unwrap(), Outcome::Resolved);
        assert_eq!("Not_Resolved".parse::<Outcome>().unwrap(), Outcome::NotResolved);
        assert!("maybe".parse::<Outcome>().is_err());
    }
}
