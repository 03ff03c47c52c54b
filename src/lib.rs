//! shopmap library: keeps a published shop map in sync with the roster PDFs
//! of a municipal shopping-certificate program.
//!
//! A run discovers the current roster PDFs, decides from the processed-URL
//! record whether anything changed, extracts shops from each PDF with an AI
//! model, geocodes them and atomically replaces the published JSON snapshot.
//!
//! # Example
//!
//! ```no_run
//! use shopmap::{run_sync, Config, RunOutcome};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     data_dir: std::path::PathBuf::from("data"),
//!     gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
//!     ..Default::default()
//! };
//!
//! match run_sync(config).await? {
//!     RunOutcome::Published(report) => {
//!         println!("Published {} shops", report.snapshot.total_shops)
//!     }
//!     RunOutcome::Skipped(reason) => println!("Nothing to do: {}", reason),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod extraction;
pub mod initialization;
pub mod models;
pub mod publish;
pub mod run;
mod storage;
pub mod tracker;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use discovery::{HttpDiscovery, SourceDiscovery};
pub use error_handling::{
    DiagnosticType, DiscoveryError, ExtractionError, GeocodeError, InitializationError,
    PublishError, RunDiagnostics, SyncError,
};
pub use extraction::{GeminiBackend, ShopExtractor};
pub use models::{Coordinate, Document, DocumentCategory, ProcessingMetadata, ShopRecord, Snapshot};
pub use publish::{build_snapshot, validate_shops, PublishReport, SnapshotPublisher};
pub use run::{run_sync, Orchestrator, RunOutcome, RunState, SkipReason};
pub use tracker::{load_record, save_record, should_process, ProcessedUrlRecord, UrlChanges};
