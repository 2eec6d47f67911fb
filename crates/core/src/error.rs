//! Error types for the triagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them for callers that don't care which layer failed.

use thiserror::Error;

/// The top-level error type for triagent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Pattern store errors ---
    #[error("Pattern store error: {0}")]
    Store(#[from] StoreError),

    // --- Issue tracker errors ---
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Filesystem ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures reported by an external reasoning agent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent '{agent}' timed out after {timeout_secs}s")]
    Timeout { agent: String, timeout_secs: u64 },

    #[error("Agent '{agent}' failed: {reason}")]
    Execution { agent: String, reason: String },

    #[error("Agent backend not configured: {0}")]
    NotConfigured(String),
}

/// Failures of the append-only pattern log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pattern log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize pattern: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt pattern record on line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}

/// Failures talking to the issue tracker.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("LINEAR_API_KEY is not set. Get an API key from https://linear.app/settings/api")]
    MissingApiKey,

    #[error("tracker request failed: {0}")]
    Request(String),

    #[error("tracker returned errors: {0}")]
    Api(String),

    #[error("issue {0} not found")]
    NotFound(String),

    #[error("failed to update issue {issue_id}: {reason}")]
    WriteFailed { issue_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_timeout_displays_agent_and_duration() {
        let err = Error::Agent(AgentError::Timeout {
            agent: "bug-hunter".into(),
            timeout_secs: 60,
        });
        assert!(err.to_string().contains("bug-hunter"));
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn corrupt_store_error_names_line() {
        let err = StoreError::Corrupt {
            line: 3,
            reason: "expected value".into(),
        };
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn tracker_write_failure_displays_issue() {
        let err = Error::Tracker(TrackerError::WriteFailed {
            issue_id: "SP-1242".into(),
            reason: "priority update rejected".into(),
        });
        assert!(err.to_string().contains("SP-1242"));
    }
}
