//! Structured-output contracts: turning agent text into typed records.
//!
//! Agents answer in free text. This crate isolates the two halves of making
//! that text usable:
//!
//! ```text
//! ┌──────────┐  raw text  ┌───────────┐ candidate ┌───────────┐ typed record
//! │  Agent   │───────────▶│ Extractor │──────────▶│ Validator │─────────────▶
//! │ Invoker  │            └───────────┘  (Value)  └───────────┘
//! └──────────┘                  │                       │
//!      ▲                        └──── error text ───────┘
//!      └──────────── retry with feedback (bounded) ─────┘
//! ```
//!
//! - [`extract()`] recovers a JSON object/array from prose, fences, or noise.
//! - [`validate()`] checks it against a declared [`Schema`] and deserializes.
//! - [`RetryCoordinator`] drives agent → extract → validate with a hard
//!   attempt bound, feeding each failure back into the next prompt.

mod extract;
mod prompt;
mod records;
mod retry;
mod schema;
mod validate;

pub use extract::{PREVIEW_CHARS, extract};
pub use prompt::{DATA_END, DATA_START, build_prompt, with_feedback};
pub use retry::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, RetryCoordinator, RetryPolicy};
pub use schema::{Field, FieldType, Schema, StructuredOutput};
pub use validate::{validate, validate_against};

use std::fmt;
use triagent_core::AgentError;

/// No structured value could be recovered from agent text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("agent returned an empty response")]
    Empty,

    #[error("could not extract valid JSON from agent response. Preview: {preview}")]
    NotFound { preview: String },
}

/// One schema violation, addressed by a dotted path (`citations[0].excerpt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A candidate did not match its declared schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{type_name} failed validation: {}", join_violations(.violations))]
pub struct ValidationError {
    pub type_name: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(type_name: &str, path: &str, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.to_string(),
            violations: vec![FieldViolation::new(path, message)],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a single attempt produced no usable record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The only error that leaves the retry coordinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    #[error("agent '{agent}' produced no usable result after {attempts} attempt(s): {last}")]
    Exhausted {
        agent: String,
        attempts: u32,
        last: Box<AttemptError>,
    },
}

impl RetryError {
    /// The error from the final attempt.
    pub fn last_error(&self) -> &AttemptError {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }
}
