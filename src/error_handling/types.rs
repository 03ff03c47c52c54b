//! Error type definitions.
//!
//! This module defines the error enums for each collaborator, the run-level
//! `SyncError`, and the diagnostic kinds counted for absorbed conditions.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::run::RunState;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A required credential was not configured.
    #[error("{0} environment variable not set")]
    MissingApiKeyError(&'static str),

    /// The discovery source could not be set up from the configured URLs.
    #[error("Discovery initialization error: {0}")]
    DiscoveryError(#[from] DiscoveryError),
}

/// Failures of the listing-page discovery.
///
/// Never fatal: the orchestrator degrades these to an empty document set.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("listing page request failed: {0}")]
    Request(#[from] ReqwestError),

    #[error("listing page returned HTTP {0}")]
    Status(u16),

    #[error("invalid listing URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failures of the extraction collaborator.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The PDF could not be downloaded.
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The PDF exceeds the size the extraction API accepts inline.
    #[error("document {url} is too large ({bytes} bytes)")]
    TooLarge { url: String, bytes: usize },

    /// Transport error talking to the AI service.
    #[error("AI request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The AI service answered with a non-success status.
    #[error("AI service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The per-run call budget is exhausted.
    #[error("AI call budget exhausted ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },

    /// The response could not be turned into shop records.
    #[error("malformed AI response: {0}")]
    Malformed(String),

    /// The response parsed but contained no usable shop.
    #[error("no shops extracted from {url}")]
    Empty { url: String },
}

impl ExtractionError {
    /// Whether a later attempt may succeed without any change on our side.
    ///
    /// Rate limiting, overload, timeouts and connection failures are transient.
    /// Authentication errors, quota exhaustion and unparseable output are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractionError::Download { source, .. } => super::is_transient_reqwest(source),
            ExtractionError::Request(source) => super::is_transient_reqwest(source),
            ExtractionError::Api { status, message } => {
                super::is_transient_status(*status)
                    || message.to_lowercase().contains("overloaded")
            }
            ExtractionError::TooLarge { .. }
            | ExtractionError::QuotaExceeded { .. }
            | ExtractionError::Malformed(_)
            | ExtractionError::Empty { .. } => false,
        }
    }
}

/// Failures of the geocoding collaborator.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The geocoding API refused the request (bad key, quota, malformed query).
    #[error("geocoding API returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        status: String,
        message: Option<String>,
    },
}

/// Failures writing the snapshot or the processed-URL record.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A run that ended in the `Failed` state.
///
/// Carries the collaborator failure; `state()` names the state the run was in.
/// Persisted files are untouched whenever one of these is returned.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ExtractionError,
    },

    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),

    #[error("initialization failed: {0}")]
    Initialization(#[from] InitializationError),
}

impl SyncError {
    /// The state in which the run failed.
    pub fn state(&self) -> RunState {
        match self {
            SyncError::Extraction { .. } => RunState::Extracting,
            SyncError::Geocode(_) => RunState::Geocoding,
            SyncError::Publish(_) => RunState::Publishing,
            SyncError::Initialization(_) => RunState::Idle,
        }
    }

    /// Whether the next scheduled run is likely to succeed unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Extraction { source, .. } => source.is_transient(),
            SyncError::Geocode(GeocodeError::Request(e)) => super::is_transient_reqwest(e),
            SyncError::Geocode(GeocodeError::Api { status, .. }) => status == "OVER_QUERY_LIMIT",
            SyncError::Publish(_) | SyncError::Initialization(_) => false,
        }
    }
}

/// Conditions absorbed during a run and reported in the diagnostics summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum DiagnosticType {
    // Validation drops
    MissingName,
    MissingAddress,
    // Extraction
    UnnamedEntrySkipped,
    RepairedResponse,
    // Geocoding
    Geocoded,
    GeocodeOutOfArea,
    GeocodeNoResult,
    DistrictFallback,
    DefaultCoordinateFallback,
}

impl DiagnosticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticType::MissingName => "Record dropped: missing name",
            DiagnosticType::MissingAddress => "Record dropped: missing address",
            DiagnosticType::UnnamedEntrySkipped => "Extracted entry without a name",
            DiagnosticType::RepairedResponse => "AI response repaired",
            DiagnosticType::Geocoded => "Geocoded",
            DiagnosticType::GeocodeOutOfArea => "Geocode result outside Tokyo",
            DiagnosticType::GeocodeNoResult => "Geocode without result",
            DiagnosticType::DistrictFallback => "District centroid used",
            DiagnosticType::DefaultCoordinateFallback => "Default coordinate used",
        }
    }

    /// Whether this diagnostic means a record was excluded from the snapshot.
    pub fn is_validation_drop(&self) -> bool {
        matches!(
            self,
            DiagnosticType::MissingName | DiagnosticType::MissingAddress
        )
    }
}

impl std::fmt::Display for DiagnosticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_transience() {
        let rate_limited = ExtractionError::Api {
            status: 429,
            message: "Resource has been exhausted".into(),
        };
        assert!(rate_limited.is_transient());

        let overloaded = ExtractionError::Api {
            status: 503,
            message: "The model is overloaded".into(),
        };
        assert!(overloaded.is_transient());

        let unauthorized = ExtractionError::Api {
            status: 403,
            message: "API key not valid".into(),
        };
        assert!(!unauthorized.is_transient());
    }

    #[test]
    fn test_permanent_extraction_errors() {
        assert!(!ExtractionError::QuotaExceeded { used: 45, limit: 45 }.is_transient());
        assert!(!ExtractionError::Malformed("not json".into()).is_transient());
        assert!(!ExtractionError::Empty {
            url: "https://example.com/tempo.pdf".into()
        }
        .is_transient());
    }

    #[test]
    fn test_sync_error_state() {
        let err = SyncError::Extraction {
            url: "https://example.com/tempo.pdf".into(),
            source: ExtractionError::Malformed("x".into()),
        };
        assert_eq!(err.state(), RunState::Extracting);

        let err = SyncError::from(GeocodeError::Api {
            status: "REQUEST_DENIED".into(),
            message: None,
        });
        assert_eq!(err.state(), RunState::Geocoding);
        assert!(!err.is_transient());

        let err = SyncError::from(PublishError::Io {
            path: PathBuf::from("data/latest.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.state(), RunState::Publishing);
    }

    #[test]
    fn test_geocode_error_message() {
        let err = GeocodeError::Api {
            status: "REQUEST_DENIED".into(),
            message: Some("The provided API key is invalid.".into()),
        };
        assert_eq!(
            err.to_string(),
            "geocoding API returned REQUEST_DENIED: The provided API key is invalid."
        );

        let err = GeocodeError::Api {
            status: "OVER_QUERY_LIMIT".into(),
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "geocoding API returned OVER_QUERY_LIMIT: no error message"
        );
    }

    #[test]
    fn test_validation_drop_kinds() {
        assert!(DiagnosticType::MissingName.is_validation_drop());
        assert!(DiagnosticType::MissingAddress.is_validation_drop());
        assert!(!DiagnosticType::DistrictFallback.is_validation_drop());
    }
}
