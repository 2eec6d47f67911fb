//! Issue tracker trait: where tickets come from and where analyses go back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::TrackerError;

/// A ticket as fetched from the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub team: Option<IssueTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueState {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueTeam {
    pub key: String,
}

impl Issue {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn state_name(&self) -> &str {
        self.state.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown")
    }
}

/// A historical issue considered similar to the one under investigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIssue {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub state: String,
    #[serde(default)]
    pub labels: String,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn fetch_issue(&self, issue_id: &str) -> std::result::Result<Issue, TrackerError>;

    /// Set priority and post a comment. Read-only trackers log and return `Ok`.
    async fn update_issue(
        &self,
        issue_id: &str,
        priority: u8,
        comment: &str,
    ) -> std::result::Result<(), TrackerError>;

    async fn find_similar_issues(
        &self,
        issue_id: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<SimilarIssue>, TrackerError>;

    /// Browser URL for an issue.
    fn issue_url(&self, issue_id: &str) -> String;
}
