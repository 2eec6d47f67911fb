//! # triagent core
//!
//! Domain types, traits, and error definitions for triagent, the support
//! ticket triage and investigation tool. This crate has no I/O of its own;
//! it defines the model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external collaborator (reasoning agent, issue tracker) is a trait
//! here with implementations in its own crate. Workflows only see the traits,
//! so tests swap in scripted implementations.

pub mod error;
pub mod citation;
pub mod pattern;
pub mod analysis;
pub mod agent;
pub mod tracker;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, Error, Result, StoreError, TrackerError};
pub use citation::{Citation, EmptyCitationField, SourceType};
pub use pattern::{Outcome, Pattern, PatternMatch};
pub use analysis::{
    Complexity, ConfidenceLevel, Finding, InvestigationResult, Recommendation, Severity,
    SeverityAnalysis, TriageResult, ValidityAnalysis,
};
pub use agent::AgentInvoker;
pub use tracker::{Issue, IssueState, IssueTeam, IssueTracker, SimilarIssue};
