//! `triagent patterns`: Query and maintain the pattern store.

use triagent_config::AppConfig;
use triagent_core::Outcome;

use super::CmdResult;

pub fn find(config: &AppConfig, text: &str, min_confidence: Option<f64>) -> CmdResult {
    let store = super::pattern_store(config)?;
    let min_confidence = min_confidence.unwrap_or(config.patterns.min_confidence);
    let matches = store.find_matching_patterns(text, min_confidence)?;

    println!("🔍 Patterns matching \"{text}\" (confidence ≥ {min_confidence:.2})");
    println!();
    if matches.is_empty() {
        println!("   No matching patterns.");
        return Ok(());
    }
    for (i, m) in matches.iter().enumerate() {
        println!(
            "  {:>2}. {} [confidence: {:.2}, resolved {}x] {}",
            i + 1,
            m.pattern_id,
            m.confidence,
            m.successful_resolutions,
            m.description
        );
    }
    Ok(())
}

pub fn outcome(config: &AppConfig, pattern_id: &str, outcome: Outcome) -> CmdResult {
    let store = super::pattern_store(config)?;
    if !store.update_outcome(pattern_id, outcome)? {
        return Err(format!("Pattern {pattern_id} not found in {}", store.path().display()).into());
    }
    println!("✅ Recorded outcome '{outcome}' for {pattern_id}");
    Ok(())
}

pub fn list(config: &AppConfig) -> CmdResult {
    let store = super::pattern_store(config)?;
    let patterns = store.all_patterns()?;

    println!("🧠 Pattern store: {}", store.path().display());
    println!("   {} pattern(s)", patterns.len());
    println!();
    for p in &patterns {
        println!(
            "  {} [{:.2}, {}/{} resolved] {}",
            p.pattern_id, p.confidence, p.successful_resolutions, p.total_uses, p.issue_pattern
        );
        println!("      → {}", p.recommendation);
    }
    Ok(())
}
