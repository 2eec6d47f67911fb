//! Structured-output extraction: recover a JSON value from free-form agent text.
//!
//! Agents wrap their JSON in prose, markdown fences, or both. The extractor
//! runs an ordered fallback chain and the first stage that yields an object
//! or array wins:
//!
//! 1. the whole text as JSON
//! 2. fenced blocks tagged ```` ```json ````
//! 3. untagged fenced blocks
//! 4. balanced `{...}` / `[...]` substrings (one level of nesting), longest first
//!
//! Scalars (`42`, `"text"`) are never accepted as a candidate.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::ExtractError;

/// Characters of input kept in the error preview.
pub const PREVIEW_CHARS: usize = 200;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)\s*```").expect("static regex"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("static regex"));

/// Extract a candidate structured value from raw agent text.
pub fn extract(text: &str) -> Result<Value, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Some(value) = parse_structured(text.trim()) {
        debug!("Parsed agent output directly");
        return Ok(value);
    }

    for (stage, fence) in [("json fence", &*JSON_FENCE), ("bare fence", &*ANY_FENCE)] {
        for caps in fence.captures_iter(text) {
            if let Some(value) = caps.get(1).and_then(|m| parse_structured(m.as_str().trim())) {
                debug!(stage, "Extracted JSON from fenced block");
                return Ok(value);
            }
        }
    }

    let mut candidates = balanced_spans(text, b'{', b'}');
    candidates.extend(balanced_spans(text, b'[', b']'));
    // Stable sort: equal lengths keep encounter order.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    for candidate in candidates {
        if let Some(value) = parse_structured(candidate) {
            debug!(len = candidate.len(), "Extracted JSON from embedded span");
            return Ok(value);
        }
    }

    Err(ExtractError::NotFound {
        preview: preview(text),
    })
}

/// Parse `text` as JSON, keeping only objects and arrays.
fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Non-overlapping `open ... close` spans, scanning left to right.
///
/// A span may contain one nested level of the same delimiters; a start
/// position whose span would need deeper nesting (or never closes) is
/// skipped and scanning resumes at the next byte. Spans are tried
/// independently, never joined across the text between them.
fn balanced_spans(text: &str, open: u8, close: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        if bytes[start] != open {
            start += 1;
            continue;
        }
        match span_end(bytes, start, open, close) {
            Some(end) => {
                spans.push(&text[start..=end]);
                start = end + 1;
            }
            None => start += 1,
        }
    }

    spans
}

fn span_end(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 1usize;
    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        if b == open {
            if depth == 2 {
                return None;
            }
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// First [`PREVIEW_CHARS`] characters, with an ellipsis when truncated.
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
