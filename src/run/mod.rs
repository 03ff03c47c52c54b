//! Processing orchestration.
//!
//! One run walks `Idle → Discovering → Deciding → Extracting → Geocoding →
//! Publishing → Done`. Any collaborator failure after discovery moves it to
//! `Failed` and returns a `SyncError` before anything is written.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{error, info, warn};

use crate::app::print_diagnostics;
use crate::config::{Config, DISCOVERY_TIMEOUT};
use crate::discovery::{HttpDiscovery, SourceDiscovery};
use crate::error_handling::{InitializationError, RunDiagnostics, SyncError};
use crate::extraction::{GeminiBackend, ShopExtractor};
use crate::initialization::init_client;
use crate::models::{Document, ProcessingMetadata, ShopRecord};
use crate::publish::{validate_shops, PublishReport, SnapshotPublisher};
use crate::tracker::{load_record, log_changes, should_process, UrlChanges};

/// States of a processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Deciding,
    Extracting,
    Geocoding,
    Publishing,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Discovering => "discovering",
            RunState::Deciding => "deciding",
            RunState::Extracting => "extracting",
            RunState::Geocoding => "geocoding",
            RunState::Publishing => "publishing",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run finished without publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The discovered documents are the ones already published
    Unchanged,
    /// Discovery found nothing; treated as an outage
    NothingDiscovered,
    /// A forced run found no documents, neither discovered nor recorded
    NothingToProcess,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::Unchanged => "documents unchanged since the last run",
            SkipReason::NothingDiscovered => "no documents discovered",
            SkipReason::NothingToProcess => "no documents to process",
        })
    }
}

/// How a successful run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Published(Box<PublishReport>),
    Skipped(SkipReason),
}

impl RunOutcome {
    pub fn data_updated(&self) -> bool {
        matches!(self, RunOutcome::Published(_))
    }

    /// Shops in the new snapshot, 0 when nothing was published.
    pub fn shops_count(&self) -> usize {
        match self {
            RunOutcome::Published(report) => report.snapshot.total_shops,
            RunOutcome::Skipped(_) => 0,
        }
    }

    /// Documents behind the new snapshot, 0 when nothing was published.
    pub fn pdfs_processed(&self) -> usize {
        match self {
            RunOutcome::Published(report) => report.snapshot.processed_pdfs.len(),
            RunOutcome::Skipped(_) => 0,
        }
    }
}

/// Drives one run over a discovery source, an extractor and a publisher.
pub struct Orchestrator {
    discovery: Box<dyn SourceDiscovery>,
    extractor: Box<dyn ShopExtractor>,
    publisher: SnapshotPublisher,
    force: bool,
    document_delay: Duration,
    state: RunState,
}

impl Orchestrator {
    pub fn new(
        discovery: Box<dyn SourceDiscovery>,
        extractor: Box<dyn ShopExtractor>,
        publisher: SnapshotPublisher,
    ) -> Self {
        Self {
            discovery,
            extractor,
            publisher,
            force: false,
            document_delay: Duration::ZERO,
            state: RunState::Idle,
        }
    }

    /// Process even when the documents did not change.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Pause between two document extractions.
    pub fn with_document_delay(mut self, delay: Duration) -> Self {
        self.document_delay = delay;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        info!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Executes the run.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` when extraction, geocoding or publishing fails; the
    /// orchestrator is then in `RunState::Failed` and no file was modified.
    pub async fn run(&mut self) -> Result<RunOutcome, SyncError> {
        match self.run_inner().await {
            Ok(outcome) => {
                self.transition(RunState::Done);
                Ok(outcome)
            }
            Err(e) => {
                error!("Run failed while {}: {}", e.state(), e);
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<RunOutcome, SyncError> {
        self.transition(RunState::Discovering);
        let mut discovered = match self.discovery.discover().await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Discovery failed, continuing with no documents: {}", e);
                Vec::new()
            }
        };

        self.transition(RunState::Deciding);
        let previous = load_record(&self.publisher.record_path());
        let changes = UrlChanges::between(&discovered, previous.as_ref());
        if !discovered.is_empty() {
            log_changes(&changes);
        }

        if !should_process(&discovered, previous.as_ref(), self.force) {
            let reason = if discovered.is_empty() {
                warn!("No PDF URLs discovered; keeping the previous snapshot");
                SkipReason::NothingDiscovered
            } else {
                info!("PDFs unchanged; use --force to process anyway");
                SkipReason::Unchanged
            };
            return Ok(RunOutcome::Skipped(reason));
        }

        if discovered.is_empty() {
            // Forced run during an outage: re-process what is already published
            let recorded = previous.as_ref().map(|r| r.all_urls()).unwrap_or_default();
            if recorded.is_empty() {
                warn!("Forced run but no documents are known; nothing to process");
                return Ok(RunOutcome::Skipped(SkipReason::NothingToProcess));
            }
            warn!(
                "Forced run with nothing discovered; re-processing {} recorded URL{}",
                recorded.len(),
                if recorded.len() == 1 { "" } else { "s" }
            );
            discovered = recorded;
        }

        self.transition(RunState::Extracting);
        let documents: Vec<Document> = discovered.iter().map(Document::new).collect();
        let mut shops: Vec<ShopRecord> = Vec::new();
        let mut processed: Vec<String> = Vec::with_capacity(documents.len());
        for (i, document) in documents.iter().enumerate() {
            if i > 0 && !self.document_delay.is_zero() {
                tokio::time::sleep(self.document_delay).await;
            }
            info!("Document {}/{}: {}", i + 1, documents.len(), document.url);
            let extracted =
                self.extractor
                    .extract(document)
                    .await
                    .map_err(|source| SyncError::Extraction {
                        url: document.url.clone(),
                        source,
                    })?;
            shops.extend(extracted);
            processed.push(document.url.clone());
        }
        info!(
            "Extracted {} shops from {} documents ({} AI calls)",
            shops.len(),
            processed.len(),
            self.extractor.api_calls_used()
        );

        // Records that cannot be published are dropped before they cost a lookup
        let extracted_count = shops.len();
        let shops = validate_shops(shops, self.publisher.diagnostics());
        let dropped = extracted_count - shops.len();

        self.transition(RunState::Geocoding);
        let shops = self.extractor.geocode(shops).await?;

        self.transition(RunState::Publishing);
        let now = Utc::now();
        let metadata = ProcessingMetadata {
            model: self.extractor.model().to_string(),
            discovery_url: self.discovery.source().to_string(),
            processing_time: now,
            api_calls_used: self.extractor.api_calls_used(),
            coordinate_method: self.extractor.coordinate_method().to_string(),
        };
        let mut report = self
            .publisher
            .publish(shops, &discovered, &processed, metadata, now)?;
        report.dropped += dropped;
        Ok(RunOutcome::Published(Box::new(report)))
    }
}

/// Runs one synchronisation with the production collaborators.
///
/// Builds the HTTP client, listing-page discovery, the Gemini backend and the
/// publisher from `config`, runs the orchestrator and logs the diagnostics.
///
/// # Errors
///
/// Returns `SyncError::Initialization` when the client cannot be built, the
/// Gemini key is missing or the listing URLs are invalid; any other
/// `SyncError` comes from the run itself.
pub async fn run_sync(config: Config) -> Result<RunOutcome, SyncError> {
    let start = Instant::now();
    let diagnostics = Arc::new(RunDiagnostics::new());

    let client = init_client(&config)?;
    let discovery = HttpDiscovery::new(
        client.clone(),
        config.search_url.as_str(),
        &config.base_url,
        DISCOVERY_TIMEOUT,
    )
    .map_err(InitializationError::from)?;
    let extractor = GeminiBackend::from_config(&config, client, Arc::clone(&diagnostics))?;
    let publisher =
        SnapshotPublisher::new(&config.data_dir, config.keep_history, Arc::clone(&diagnostics));

    if config.force {
        info!("Force processing enabled");
    }
    let mut orchestrator = Orchestrator::new(Box::new(discovery), Box::new(extractor), publisher)
        .with_force(config.force)
        .with_document_delay(config.document_delay());

    let result = orchestrator.run().await;
    print_diagnostics(&diagnostics);
    info!("Run finished in {:.1}s", start.elapsed().as_secs_f64());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(RunState::Deciding.to_string(), "deciding");
        assert_eq!(RunState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_skipped_outcome_counts() {
        let outcome = RunOutcome::Skipped(SkipReason::Unchanged);
        assert!(!outcome.data_updated());
        assert_eq!(outcome.shops_count(), 0);
        assert_eq!(outcome.pdfs_processed(), 0);
    }

    #[tokio::test]
    async fn test_run_sync_requires_gemini_key() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            gemini_api_key: None,
            ..Config::default()
        };
        let err = run_sync(config).await.expect_err("missing key");
        assert!(matches!(err, SyncError::Initialization(_)));
        assert_eq!(err.state(), RunState::Idle);
    }
}
