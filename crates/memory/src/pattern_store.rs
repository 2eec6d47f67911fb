//! File-backed pattern store: append-only JSON-lines log.
//!
//! Each line is a JSON-encoded [`Pattern`]. New patterns are appended; the
//! only rewrite is `update_outcome`, which replaces the whole file with one
//! record changed. The rewrite goes through a temp file in the same directory
//! and a rename, so readers never observe a half-written log.
//!
//! Writes from one store instance are serialized by a mutex. Several
//! processes writing the same file at once is not supported.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use triagent_core::{Citation, Outcome, Pattern, PatternMatch, StoreError};

/// Hex characters of the digest kept in a pattern id.
const ID_HEX_CHARS: usize = 12;

/// Durable log of learned resolution patterns.
pub struct PatternStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PatternStore {
    /// Open a store at `path`, creating the parent directory if needed.
    ///
    /// The file itself is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "Pattern store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new pattern and return its generated id.
    pub fn record_pattern(
        &self,
        issue_pattern: &str,
        recommendation: &str,
        citations: Vec<Citation>,
        outcome: Option<Outcome>,
    ) -> Result<String, StoreError> {
        let _guard = self.lock();
        let now = Utc::now();
        let pattern_id = generate_id(now, issue_pattern);
        let pattern = Pattern::new(
            &pattern_id,
            issue_pattern,
            recommendation,
            citations,
            outcome,
            now,
        );

        let mut line = serde_json::to_string(&pattern)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        info!(
            pattern_id = %pattern_id,
            confidence = pattern.confidence,
            "Recorded pattern"
        );
        Ok(pattern_id)
    }

    /// Patterns whose text overlaps `issue_description` with confidence of at
    /// least `min_confidence`, highest confidence first.
    ///
    /// Corrupt lines are skipped with a warning.
    pub fn find_matching_patterns(
        &self,
        issue_description: &str,
        min_confidence: f64,
    ) -> Result<Vec<PatternMatch>, StoreError> {
        let Some(content) = self.read_log()? else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<PatternMatch> = records(&content)
            .filter_map(|(line, record)| match record {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(line, error = %e, "Skipping corrupt pattern record");
                    None
                }
            })
            .filter(|p| p.confidence >= min_confidence && p.matches(issue_description))
            .map(|p| p.to_match())
            .collect();

        // Stable: equal confidence keeps file order.
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        debug!(count = matches.len(), min_confidence, "Pattern lookup finished");
        Ok(matches)
    }

    /// Record the outcome of another use of `pattern_id`.
    ///
    /// Returns `Ok(false)` without touching the file when the id is unknown.
    pub fn update_outcome(&self, pattern_id: &str, outcome: Outcome) -> Result<bool, StoreError> {
        let _guard = self.lock();
        let Some(content) = self.read_log()? else {
            return Ok(false);
        };

        let mut patterns = Vec::new();
        for (line, record) in records(&content) {
            patterns.push(record.map_err(|e| StoreError::Corrupt {
                line,
                reason: e.to_string(),
            })?);
        }

        let Some(pattern) = patterns.iter_mut().find(|p| p.pattern_id == pattern_id) else {
            debug!(pattern_id, "No pattern with this id");
            return Ok(false);
        };
        pattern.apply_outcome(outcome, Utc::now());
        info!(
            pattern_id,
            outcome = %outcome,
            confidence = pattern.confidence,
            total_uses = pattern.total_uses,
            "Updated pattern outcome"
        );

        self.rewrite(&patterns)?;
        Ok(true)
    }

    /// Every stored pattern in file order.
    pub fn all_patterns(&self) -> Result<Vec<Pattern>, StoreError> {
        let Some(content) = self.read_log()? else {
            return Ok(Vec::new());
        };
        records(&content)
            .map(|(line, record)| {
                record.map_err(|e| StoreError::Corrupt {
                    line,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` when the log has never been written.
    fn read_log(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn rewrite(&self, patterns: &[Pattern]) -> Result<(), StoreError> {
        let mut content = String::new();
        for pattern in patterns {
            content.push_str(&serde_json::to_string(pattern)?);
            content.push('\n');
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Non-blank lines with their 1-based line numbers, parsed.
fn records(content: &str) -> impl Iterator<Item = (usize, serde_json::Result<Pattern>)> + '_ {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, serde_json::from_str::<Pattern>(line)))
}

/// `P-` followed by a digest of the capture time and the pattern text.
fn generate_id(now: DateTime<Utc>, issue_pattern: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(now.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true).as_bytes());
    hasher.update(issue_pattern.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("P-{}", &digest[..ID_HEX_CHARS])
}
