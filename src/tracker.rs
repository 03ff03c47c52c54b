//! Change tracking between runs.
//!
//! The processed-URL record names the documents behind the currently published
//! snapshot. A run compares the freshly discovered URLs against it to decide
//! whether the expensive extraction is needed at all.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error_handling::PublishError;
use crate::models::DocumentCategory;
use crate::storage::{read_json, write_json_atomic};

/// Document URLs of the last successful run, grouped by roster category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedUrlRecord {
    pub urls: BTreeMap<DocumentCategory, Vec<String>>,
    pub last_processed: DateTime<Utc>,
    pub count: usize,
}

impl ProcessedUrlRecord {
    /// Builds a record from a flat URL list, classifying each URL.
    pub fn from_urls<S: AsRef<str>>(urls: &[S], now: DateTime<Utc>) -> Self {
        let mut grouped: BTreeMap<DocumentCategory, Vec<String>> = BTreeMap::new();
        for url in urls {
            let url = url.as_ref();
            grouped
                .entry(DocumentCategory::from_url(url))
                .or_default()
                .push(url.to_string());
        }
        for list in grouped.values_mut() {
            list.sort();
            list.dedup();
        }
        let count = grouped.values().map(Vec::len).sum();
        Self {
            urls: grouped,
            last_processed: now,
            count,
        }
    }

    /// All recorded URLs regardless of category.
    pub fn url_set(&self) -> BTreeSet<&str> {
        self.urls
            .values()
            .flat_map(|list| list.iter().map(String::as_str))
            .collect()
    }

    /// All recorded URLs, sorted.
    pub fn all_urls(&self) -> Vec<String> {
        self.url_set().into_iter().map(str::to_string).collect()
    }
}

/// URLs that appeared and disappeared between two runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl UrlChanges {
    pub fn between(discovered: &[String], previous: Option<&ProcessedUrlRecord>) -> Self {
        let current: BTreeSet<&str> = discovered.iter().map(String::as_str).collect();
        let last = previous.map(ProcessedUrlRecord::url_set).unwrap_or_default();
        Self {
            added: current.difference(&last).map(|s| s.to_string()).collect(),
            removed: last.difference(&current).map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Decides whether the discovered documents need processing.
///
/// - `force` always processes, even with nothing discovered.
/// - An empty discovery never processes: it is a scraping outage, and the
///   previous snapshot must keep serving.
/// - Otherwise processes iff the discovered URL set differs from the record.
///   Order and duplicates are ignored; a same-size swap is a change.
/// - A missing record (first run, unreadable file) counts as different.
pub fn should_process(
    discovered: &[String],
    previous: Option<&ProcessedUrlRecord>,
    force: bool,
) -> bool {
    if force {
        return true;
    }
    if discovered.is_empty() {
        return false;
    }
    let current: BTreeSet<&str> = discovered.iter().map(String::as_str).collect();
    match previous {
        Some(record) => current != record.url_set(),
        None => true,
    }
}

/// Logs what changed since the previous record.
pub fn log_changes(changes: &UrlChanges) {
    if changes.is_empty() {
        info!("No URL changes detected");
        return;
    }
    info!("URL changes detected");
    for url in &changes.added {
        info!("   + {}", url);
    }
    for url in &changes.removed {
        info!("   - {}", url);
    }
}

/// Loads the processed-URL record.
///
/// A missing file is a first run. An unreadable or corrupt file is logged and
/// treated the same way, which makes the next non-empty discovery process.
pub fn load_record(path: &Path) -> Option<ProcessedUrlRecord> {
    match read_json::<ProcessedUrlRecord>(path) {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            info!("No processed-URL record at {} (first run)", path.display());
            None
        }
        Err(e) => {
            warn!(
                "Ignoring unreadable processed-URL record {}: {:#}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Persists the processed-URL record with an atomic replace.
pub fn save_record(path: &Path, record: &ProcessedUrlRecord) -> Result<(), PublishError> {
    write_json_atomic(path, record, "processed-URL record")?;
    info!(
        "Saved {} processed URL{} to {}",
        record.count,
        if record.count == 1 { "" } else { "s" },
        path.display()
    );
    Ok(())
}
