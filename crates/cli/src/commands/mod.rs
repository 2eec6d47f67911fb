//! Subcommand implementations and the wiring they share.

pub mod config_cmd;
pub mod investigate;
pub mod patterns;
pub mod triage;

use std::sync::Arc;
use std::time::Duration;
use triagent_config::AppConfig;
use triagent_contracts::{RetryCoordinator, RetryPolicy};
use triagent_core::IssueTracker;
use triagent_memory::PatternStore;
use triagent_tracker::LinearClient;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn tracker(config: &AppConfig) -> Arc<dyn IssueTracker> {
    Arc::new(LinearClient::from_config(&config.tracker))
}

fn coordinator(config: &AppConfig) -> Result<RetryCoordinator, Box<dyn std::error::Error>> {
    let invoker = triagent_providers::build_invoker(&config.agents)?;
    let policy = RetryPolicy::new(
        config.agents.max_retries,
        Duration::from_secs(config.agents.timeout_secs),
    );
    Ok(RetryCoordinator::new(invoker).with_policy(policy))
}

fn pattern_store(config: &AppConfig) -> Result<PatternStore, Box<dyn std::error::Error>> {
    Ok(PatternStore::open(&config.patterns.path)?)
}
