//! Analysis records produced by agents, and the workflow results built from them.

use crate::citation::Citation;
use crate::pattern::PatternMatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket priority bucket assigned during triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    P0,
    P1,
    P2,
    P3,
}

impl Severity {
    pub const ALL: [&'static str; 4] = ["P0", "P1", "P2", "P3"];

    /// Tracker priority: 1 = urgent .. 4 = low.
    pub fn tracker_priority(&self) -> u8 {
        match self {
            Severity::P0 => 1,
            Severity::P1 => 2,
            Severity::P2 => 3,
            Severity::P3 => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::P0 => "P0",
            Severity::P1 => "P1",
            Severity::P2 => "P2",
            Severity::P3 => "P3",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const ALL: [&'static str; 3] = ["simple", "medium", "complex"];

    pub fn label(&self) -> &'static str {
        match self {
            Complexity::Simple => "Simple",
            Complexity::Medium => "Medium",
            Complexity::Complex => "Complex",
        }
    }
}

/// Qualitative confidence attached to findings and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const ALL: [&'static str; 3] = ["low", "medium", "high"];

    /// Numeric score used when deciding what to record as a pattern.
    pub fn score(&self) -> f64 {
        match self {
            ConfidenceLevel::Low => 0.3,
            ConfidenceLevel::Medium => 0.6,
            ConfidenceLevel::High => 0.9,
        }
    }

    /// Map a pattern's success rate onto a level.
    pub fn from_pattern_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Medium
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Is the ticket a real, actionable problem?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityAnalysis {
    pub is_valid: bool,
    pub is_actionable: bool,
    #[serde(default)]
    pub missing_context: Vec<String>,
    pub reasoning: String,
}

/// How urgent and how hard is the ticket?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAnalysis {
    pub severity: Severity,
    pub complexity: Complexity,
    #[serde(default)]
    pub required_expertise: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub finding: String,
    pub confidence: ConfidenceLevel,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation: String,
    pub reasoning: String,
    pub confidence: ConfidenceLevel,
    pub citations: Vec<Citation>,
}

/// Outcome of a triage run. `success == false` carries `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub ticket_id: String,
    pub ticket_url: String,
    pub validity: Option<ValidityAnalysis>,
    pub severity: Option<SeverityAnalysis>,
    pub ai_comment: String,
    pub success: bool,
    pub duration_secs: f64,
    #[serde(default)]
    pub agents_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of an investigation run. `success == false` carries `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationResult {
    pub issue_id: String,
    pub issue_url: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub pattern_matches: Vec<PatternMatch>,
    pub success: bool,
    pub duration_secs: f64,
    #[serde(default)]
    pub agents_used: Vec<String>,
    #[serde(default)]
    pub similar_issues_count: usize,
    #[serde(default)]
    pub citations_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
