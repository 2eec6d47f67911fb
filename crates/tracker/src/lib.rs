//! Issue tracker integrations for triagent.
//!
//! All trackers implement the `triagent_core::IssueTracker` trait.
//! [`LinearClient`] talks to Linear's GraphQL API; [`InMemoryTracker`] holds
//! issues in process for tests and offline runs. [`history`] turns tracker
//! issues into citations and resolution statistics.

pub mod history;
pub mod in_memory;
pub mod linear;

pub use history::{ResolutionPattern, citation_from_issue, resolution_patterns, similar_from_issue};
pub use in_memory::{InMemoryTracker, RecordedUpdate};
pub use linear::LinearClient;
