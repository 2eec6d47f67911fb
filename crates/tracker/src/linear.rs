//! Linear GraphQL client.
//!
//! Minimal surface needed by the workflows: fetch an issue, set its priority
//! and post a comment. Writes are gated by a flag fixed at construction; when
//! it is off, `update_issue` logs what it would have sent and returns `Ok`.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};
use triagent_config::TrackerConfig;
use triagent_core::{Issue, IssueTracker, SimilarIssue, TrackerError};

use crate::history::similar_from_issue;

const ISSUE_QUERY: &str = r#"
query GetIssue($id: String!) {
    issue(id: $id) {
        id
        title
        description
        priority
        state { name }
        team { key }
    }
}"#;

const UPDATE_PRIORITY_MUTATION: &str = r#"
mutation UpdateIssuePriority($id: String!, $priority: Int!) {
    issueUpdate(id: $id, input: { priority: $priority }) {
        success
    }
}"#;

const ADD_COMMENT_MUTATION: &str = r#"
mutation AddComment($issueId: String!, $body: String!) {
    commentCreate(input: { issueId: $issueId, body: $body }) {
        success
    }
}"#;

/// Linear GraphQL API client.
pub struct LinearClient {
    api_url: String,
    api_key: Option<String>,
    writes_enabled: bool,
    issue_url_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl LinearClient {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            writes_enabled: config.writes_enabled,
            issue_url_base: config.issue_url_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    pub fn writes_enabled(&self) -> bool {
        self.writes_enabled
    }

    /// POST a GraphQL document and return its `data` object.
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, TrackerError> {
        let api_key = self.api_key.as_deref().ok_or(TrackerError::MissingApiKey)?;

        let response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("Authorization", api_key)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Request(format!("HTTP {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TrackerError::Request(format!("invalid response body: {e}")))?;
        graphql_data(body)
    }
}

/// Split a GraphQL response into its data or its error messages.
fn graphql_data(mut body: Value) -> Result<Value, TrackerError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| match e.get("message").and_then(Value::as_str) {
                Some(m) => m.to_string(),
                None => e.to_string(),
            })
            .collect();
        return Err(TrackerError::Api(messages.join(", ")));
    }
    Ok(body
        .get_mut("data")
        .map(Value::take)
        .unwrap_or_else(|| json!({})))
}

fn mutation_succeeded(data: &Value, field: &str) -> bool {
    data.get(field)
        .and_then(|f| f.get("success"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[async_trait]
impl IssueTracker for LinearClient {
    async fn fetch_issue(&self, issue_id: &str) -> Result<Issue, TrackerError> {
        info!(issue_id, "Fetching issue from Linear");
        let mut data = self.graphql(ISSUE_QUERY, json!({ "id": issue_id })).await?;
        match data.get_mut("issue").map(Value::take) {
            Some(issue) if !issue.is_null() => serde_json::from_value(issue)
                .map_err(|e| TrackerError::Request(format!("unexpected issue shape: {e}"))),
            _ => Err(TrackerError::NotFound(issue_id.to_string())),
        }
    }

    async fn update_issue(
        &self,
        issue_id: &str,
        priority: u8,
        comment: &str,
    ) -> Result<(), TrackerError> {
        if !self.writes_enabled {
            info!(
                issue_id,
                priority,
                comment_chars = comment.chars().count(),
                "[READ-ONLY] Skipping Linear update"
            );
            return Ok(());
        }

        info!(issue_id, priority, "Updating issue priority");
        let data = self
            .graphql(
                UPDATE_PRIORITY_MUTATION,
                json!({ "id": issue_id, "priority": priority }),
            )
            .await?;
        if !mutation_succeeded(&data, "issueUpdate") {
            return Err(TrackerError::WriteFailed {
                issue_id: issue_id.to_string(),
                reason: "priority update was not accepted".into(),
            });
        }

        debug!(issue_id, "Adding comment");
        let data = self
            .graphql(
                ADD_COMMENT_MUTATION,
                json!({ "issueId": issue_id, "body": comment }),
            )
            .await?;
        if !mutation_succeeded(&data, "commentCreate") {
            return Err(TrackerError::WriteFailed {
                issue_id: issue_id.to_string(),
                reason: "comment was not accepted".into(),
            });
        }

        info!(issue_id, "Issue updated");
        Ok(())
    }

    /// Linear exposes no similarity search yet; the issue itself is returned
    /// as the template for comparison.
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
