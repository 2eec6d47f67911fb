//! Triage and investigation workflows built on the contracts and the
//! pattern store.
//!
//! Both workflows are fail-safe at their outer edge: `run` never returns an
//! error. Any failure is logged and reported as a result with
//! `success == false` and the error message, so callers can render it.

pub mod citations;
pub mod investigation;
pub mod report;
pub mod triage;

pub use citations::CitationTracker;
pub use investigation::{InvestigationSettings, InvestigationWorkflow};
pub use triage::TriageWorkflow;

use triagent_contracts::RetryError;
use triagent_core::{EmptyCitationField, StoreError, TrackerError};

/// Anything that can stop a workflow part-way.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Agent(#[from] RetryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Citation(#[from] EmptyCitationField),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}
