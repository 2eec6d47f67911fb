//! In-memory tracker: issues held in process, updates recorded.
//!
//! Useful for testing and offline runs. Nothing is persisted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;
use triagent_core::{Issue, IssueTracker, SimilarIssue, TrackerError};

use crate::history::similar_from_issue;

/// An `update_issue` call as the tracker received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub issue_id: String,
    pub priority: u8,
    pub comment: String,
}

pub struct InMemoryTracker {
    issues: RwLock<HashMap<String, Issue>>,
    updates: RwLock<Vec<RecordedUpdate>>,
    writes_enabled: bool,
    issue_url_base: String,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self {
            issues: RwLock::new(HashMap::new()),
            updates: RwLock::new(Vec::new()),
            writes_enabled: true,
            issue_url_base: "https://linear.app/issue".into(),
        }
    }

    /// Store `issue` under `issue_id` (the human key, e.g. `SP-1242`).
    pub fn with_issue(self, issue_id: &str, issue: Issue) -> Self {
        if let Ok(mut issues) = self.issues.write() {
            issues.insert(issue_id.to_string(), issue);
        }
        self
    }

    /// When disabled, updates are logged and dropped like a read-only tracker.
    pub fn with_writes(mut self, enabled: bool) -> Self {
        self.writes_enabled = enabled;
        self
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.read().map(|u| u.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IssueTracker for InMemoryTracker {
    async fn fetch_issue(&self, issue_id: &str) -> Result<Issue, TrackerError> {
        self.issues
            .read()
            .ok()
            .and_then(|issues| issues.get(issue_id).cloned())
            .ok_or_else(|| TrackerError::NotFound(issue_id.to_string()))
    }

    async fn update_issue(
        &self,
        issue_id: &str,
        priority: u8,
        comment: &str,
    ) -> Result<(), TrackerError> {
        if !self.writes_enabled {
            info!(issue_id, priority, "[READ-ONLY] Skipping update");
            return Ok(());
        }
        let mut issues = self
            .issues
            .write()
            .map_err(|_| TrackerError::Request("issue map poisoned".into()))?;
        let issue = issues
            .get_mut(issue_id)
            .ok_or_else(|| TrackerError::NotFound(issue_id.to_string()))?;
        issue.priority = Some(priority);
        drop(issues);

        if let Ok(mut updates) = self.updates.write() {
            updates.push(RecordedUpdate {
                issue_id: issue_id.to_string(),
                priority,
                comment: comment.to_string(),
            });
        }
        Ok(())
    }

    async fn find_similar_issues(
        &self,
        issue_id: &str,
        max_results: usize,
    ) -> Result<Vec<SimilarIssue>, TrackerError> {
        let issue = self.fetch_issue(issue_id).await?;
        let mut similar = vec![similar_from_issue(issue_id, &issue, self.issue_url(issue_id))];
        similar.truncate(max_results);
        Ok(similar)
    }

    fn issue_url(&self, issue_id: &str) -> String {
        format!("{}/{issue_id}", self.issue_url_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> Issue {
        Issue {
            id: "uuid".into(),
            title: "Export times out".into(),
            description: Some("CSV export of 10k rows never finishes".into()),
            ..Issue::default()
        }
    }

    #[tokio::test]
    async fn fetch_and_update() {
        let tracker = InMemoryTracker::new().with_issue("SP-1", issue());
        assert_eq!(tracker.fetch_issue("SP-1").await.unwrap().title, "Export times out");

        tracker.update_issue("SP-1", 2, "note").await.unwrap();
        assert_eq!(tracker.fetch_issue("SP-1").await.unwrap().priority, Some(2));
        assert_eq!(tracker.updates()[0].comment, "note");
    }

    #[tokio::test]
    async fn unknown_issue_is_not_found() {
        let tracker = InMemoryTracker::new();
        assert!(matches!(
            tracker.fetch_issue("SP-404").await,
            Err(TrackerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn read_only_drops_updates() {
        let tracker = InMemoryTracker::new().with_issue("SP-1", issue()).with_writes(false);
        tracker.update_issue("SP-1", 1, "note").await.unwrap();
        assert!(tracker.updates().is_empty());
        assert_eq!(tracker.fetch_issue("SP-1").await.unwrap().priority, None);
    }

    #[tokio::test]
    async fn similar_issues_respect_limit() {
        let tracker = InMemoryTracker::new().with_issue("SP-1", issue());
        assert_eq!(tracker.find_similar_issues("SP-1", 10).await.unwrap().len(), 1);
        assert!(tracker.find_similar_issues("SP-1", 0).await.unwrap().is_empty());
    }
}
