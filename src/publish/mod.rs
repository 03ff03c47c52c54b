//! Snapshot publishing.
//!
//! Publishing is the commit point of a run. Order matters:
//! 1. the snapshot and the processed-URL record are staged next to their targets
//! 2. `latest.json` is renamed into place, then the record
//! 3. a timestamped history copy is written (best effort)
//!
//! If the record cannot be renamed, the previous `latest.json` is put back, so
//! a failed publish leaves both files as they were and the record always
//! describes the snapshot that is actually being served.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::config::{
    DATA_VERSION, HISTORY_FILE_PREFIX, PROCESSED_RECORD_FILE_NAME, SNAPSHOT_FILE_NAME,
};
use crate::error_handling::{DiagnosticType, PublishError, RunDiagnostics};
use crate::models::{ProcessingMetadata, ShopRecord, Snapshot};
use crate::storage::{read_bytes, stage_json, write_bytes_atomic, write_json_atomic};
use crate::tracker::ProcessedUrlRecord;

/// Keeps records with a non-blank name and address.
///
/// Dropped records are logged and counted; a record missing both is counted
/// once, as missing its name.
pub fn validate_shops(shops: Vec<ShopRecord>, diagnostics: &RunDiagnostics) -> Vec<ShopRecord> {
    shops
        .into_iter()
        .filter(|shop| {
            if shop.name.trim().is_empty() {
                warn!("Dropping record without a name (address: {:?})", shop.address);
                diagnostics.increment(DiagnosticType::MissingName);
                false
            } else if shop.address.trim().is_empty() {
                warn!("Dropping record without an address: {}", shop.name);
                diagnostics.increment(DiagnosticType::MissingAddress);
                false
            } else {
                true
            }
        })
        .collect()
}

/// Assembles a snapshot from validated records.
pub fn build_snapshot(
    shops: Vec<ShopRecord>,
    discovered: &[String],
    processed: &[String],
    metadata: ProcessingMetadata,
    now: DateTime<Utc>,
) -> Snapshot {
    Snapshot {
        last_updated: now,
        data_version: DATA_VERSION.to_string(),
        total_shops: shops.len(),
        processed_pdfs: processed.to_vec(),
        discovered_pdfs: discovered.to_vec(),
        shops,
        processing_metadata: metadata,
    }
}

/// What a successful publish produced.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub snapshot: Snapshot,
    pub snapshot_path: PathBuf,
    /// `None` when history is disabled or the copy could not be written
    pub history_path: Option<PathBuf>,
    /// Records excluded by validation
    pub dropped: usize,
}

/// Writes snapshots and the processed-URL record under one data directory.
pub struct SnapshotPublisher {
    data_dir: PathBuf,
    keep_history: bool,
    diagnostics: Arc<RunDiagnostics>,
}

impl SnapshotPublisher {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        keep_history: bool,
        diagnostics: Arc<RunDiagnostics>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            keep_history,
            diagnostics,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE_NAME)
    }

    pub fn record_path(&self) -> PathBuf {
        self.data_dir.join(PROCESSED_RECORD_FILE_NAME)
    }

    fn history_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.data_dir.join(format!(
            "{}{}.json",
            HISTORY_FILE_PREFIX,
            now.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Validates, writes the snapshot, then commits `processed` to the record.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the snapshot or the record cannot be written.
    /// Neither file on disk has changed when an error is returned.
    pub fn publish(
        &self,
        shops: Vec<ShopRecord>,
        discovered: &[String],
        processed: &[String],
        metadata: ProcessingMetadata,
        now: DateTime<Utc>,
    ) -> Result<PublishReport, PublishError> {
        let before = shops.len();
        let shops = validate_shops(shops, &self.diagnostics);
        let dropped = before - shops.len();
        if dropped > 0 {
            warn!("{} of {} records failed validation", dropped, before);
        }

        let snapshot = build_snapshot(shops, discovered, processed, metadata, now);
        let record = ProcessedUrlRecord::from_urls(processed, now);
        let snapshot_path = self.snapshot_path();
        let record_path = self.record_path();

        let staged_snapshot = stage_json(&snapshot_path, &snapshot, "snapshot")?;
        let staged_record = stage_json(&record_path, &record, "processed-URL record")?;
        let previous = read_bytes(&snapshot_path)?;

        staged_snapshot.commit()?;
        if let Err(e) = staged_record.commit() {
            self.restore_snapshot(previous);
            return Err(e);
        }
        info!(
            "Published {} shops to {} ({} processed URL{})",
            snapshot.total_shops,
            snapshot_path.display(),
            record.count,
            if record.count == 1 { "" } else { "s" }
        );

        let history_path = if self.keep_history {
            let path = self.history_path(now);
            match write_json_atomic(&path, &snapshot, "history snapshot") {
                Ok(()) => {
                    info!("History copy saved to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Failed to write history copy: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(PublishReport {
            snapshot,
            snapshot_path,
            history_path,
            dropped,
        })
    }

    /// Puts back the snapshot that was served before a failed publish.
    fn restore_snapshot(&self, previous: Option<Vec<u8>>) {
        let path = self.snapshot_path();
        let restored = match previous {
            Some(bytes) => write_bytes_atomic(&path, &bytes),
            None => std::fs::remove_file(&path).map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            }),
        };
        match restored {
            Ok(()) => warn!("Record write failed; restored the previous {}", path.display()),
            Err(e) => error!("Could not restore the previous snapshot: {}", e),
        }
    }
}
