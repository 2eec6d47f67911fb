//! Pattern memory for triagent.
//!
//! Learned issue-resolution patterns live in a single JSON-lines file owned
//! by [`PatternStore`]. Callers get copies ([`PatternMatch`](triagent_core::PatternMatch))
//! and change state only through `record_pattern` and `update_outcome`.

pub mod pattern_store;

pub use pattern_store::PatternStore;
