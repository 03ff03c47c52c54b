//! Parsing of model responses into JSON entries.
//!
//! The model is asked for a bare JSON array but long rosters regularly come
//! back wrapped in Markdown fences or cut off mid-object when the output token
//! limit is hit. Parsing tries the response as-is first, then a sequence of
//! repairs that keep every complete object and drop the truncated tail.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error_handling::ExtractionError;

// Start of an object that carries a shop name
const NAMED_OBJECT_START_PATTERN: &str = r#"\{\s*"name"\s*:\s*""#;
// Comma directly before a closing bracket or brace
const TRAILING_COMMA_PATTERN: &str = r",(\s*[}\]])";

static NAMED_OBJECT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(NAMED_OBJECT_START_PATTERN).expect("Failed to compile object regex - this is a bug")
});

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(TRAILING_COMMA_PATTERN)
        .expect("Failed to compile trailing comma regex - this is a bug")
});

/// Entries parsed from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntries {
    pub entries: Vec<Value>,
    /// Set when the raw response was not valid JSON and had to be repaired
    pub repaired: bool,
}

/// Removes a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the end of the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses a model response into a list of JSON entries.
///
/// # Errors
///
/// Returns `ExtractionError::Malformed` if the response is empty or no repair
/// produced at least one object.
pub fn parse_entries(response: &str) -> Result<ParsedEntries, ExtractionError> {
    let text = strip_code_fences(response);
    if text.is_empty() {
        return Err(ExtractionError::Malformed("empty response".into()));
    }

    let first_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            return Ok(ParsedEntries {
                entries: into_entries(value),
                repaired: false,
            })
        }
        Err(e) => e,
    };
    log::warn!(
        "AI response is not valid JSON ({}), attempting repair",
        first_error
    );

    let repairs: [(&str, fn(&str) -> Option<String>); 2] = [
        ("drop trailing comma", close_after_trailing_comma),
        ("truncate to last complete object", truncate_to_last_complete_object),
    ];
    for (name, repair) in repairs {
        let Some(candidate) = repair(text) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            let entries = into_entries(value);
            if !entries.is_empty() {
                log::info!("Repair '{}' recovered {} entries", name, entries.len());
                return Ok(ParsedEntries {
                    entries,
                    repaired: true,
                });
            }
        }
    }

    let entries = extract_named_objects(text);
    if !entries.is_empty() {
        log::info!(
            "Individual object extraction recovered {} entries",
            entries.len()
        );
        return Ok(ParsedEntries {
            entries,
            repaired: true,
        });
    }

    Err(ExtractionError::Malformed(format!(
        "{} ({} chars, no repair succeeded)",
        first_error,
        text.len()
    )))
}

/// Normalises the top-level value into a list of entries.
///
/// Accepts a bare array, an object wrapping one array (`{"shops": [...]}`),
/// or a single shop object.
fn into_entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if map.contains_key("name") {
                return vec![Value::Object(map)];
            }
            map.into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// `[{...}, {...},` → `[{...}, {...}]`
fn close_after_trailing_comma(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    let without = trimmed.strip_suffix(',')?;
    Some(format!("{}]", without.trim_end()))
}

/// Cuts the text after the last object that closed directly inside the
/// top-level array and closes the array.
fn truncate_to_last_complete_object(text: &str) -> Option<String> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut last_complete = None;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                // depth 1 means we are back inside the outer array
                if c == '}' && depth == 1 {
                    last_complete = Some(start + offset);
                }
            }
            _ => {}
        }
    }

    let end = last_complete?;
    Some(format!("{}]", &text[..=end]))
}

/// Finds every balanced `{"name": ...}` object in the text and parses those
/// that are valid (after removing trailing commas). De-duplicated by name.
fn extract_named_objects(text: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for m in NAMED_OBJECT_START.find_iter(text) {
        let Some(end) = balanced_object_end(text, m.start()) else {
            continue;
        };
        let slice = &text[m.start()..=end];
        let parsed = serde_json::from_str::<Value>(slice).or_else(|_| {
            let cleaned = TRAILING_COMMA.replace_all(slice, "$1");
            serde_json::from_str::<Value>(&cleaned)
        });
        let Ok(value) = parsed else {
            continue;
        };
        let Some(name) = value.get("name").and_then(Value::as_str) else {
            continue;
        };
        if !name.trim().is_empty() && seen.insert(name.to_string()) {
            entries.push(value);
        }
    }
    entries
}

/// Byte index of the `}` closing the object that opens at `start`.
fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
