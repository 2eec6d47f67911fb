//! Citations: pointers to the evidence behind a finding or recommendation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of source a citation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Issue,
    Commit,
    Codebase,
    Logs,
    Pattern,
}

impl SourceType {
    /// All accepted wire names, in declaration order.
    pub const ALL: [&'static str; 5] = ["issue", "commit", "codebase", "logs", "pattern"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Issue => "issue",
            SourceType::Commit => "commit",
            SourceType::Codebase => "codebase",
            SourceType::Logs => "logs",
            SourceType::Pattern => "pattern",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single source citation.
///
/// Fields are private: a citation is immutable once built, and
/// [`Citation::new`] refuses empty identifiers, URLs and excerpts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    source_type: SourceType,
    source_id: String,
    source_url: String,
    excerpt: String,
    #[serde(default = "Utc::now")]
    retrieved_at: DateTime<Utc>,
}

/// Returned by [`Citation::new`] when a required field is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("citation field '{0}' must not be empty")]
pub struct EmptyCitationField(pub &'static str);

impl Citation {
    /// Build a citation stamped with the current time.
    pub fn new(
        source_type: SourceType,
        source_id: impl Into<String>,
        source_url: impl Into<String>,
        excerpt: impl Into<String>,
    ) -> Result<Self, EmptyCitationField> {
        let citation = Self {
            source_type,
            source_id: source_id.into(),
            source_url: source_url.into(),
            excerpt: excerpt.into(),
            retrieved_at: Utc::now(),
        };
        if citation.source_id.trim().is_empty() {
            return Err(EmptyCitationField("source_id"));
        }
        if citation.source_url.trim().is_empty() {
            return Err(EmptyCitationField("source_url"));
        }
        if citation.excerpt.trim().is_empty() {
            return Err(EmptyCitationField("excerpt"));
        }
        Ok(citation)
    }

    /// Override the capture timestamp (used when replaying stored citations).
    pub fn retrieved(mut self, at: DateTime<Utc>) -> Self {
        self.retrieved_at = at;
        self
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}
