//! `triagent config`: Configuration management commands.

use std::path::Path;
use triagent_config::AppConfig;

use super::CmdResult;

const REDACTED: &str = "[REDACTED]";

pub fn show(config: &AppConfig) -> CmdResult {
    let mut shown = config.clone();
    if shown.agents.api_key.is_some() {
        shown.agents.api_key = Some(REDACTED.into());
    }
    if shown.tracker.api_key.is_some() {
        shown.tracker.api_key = Some(REDACTED.into());
    }
    let toml_str = toml::to_string_pretty(&shown)?;
    println!("{toml_str}");
    Ok(())
}

pub fn init(path: &Path, force: bool) -> CmdResult {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}
