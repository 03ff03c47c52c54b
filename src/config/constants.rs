//! Configuration constants.
//!
//! This module defines the constants used throughout the application, including
//! the well-known file names, snapshot format version, and retry parameters.

use std::time::Duration;

/// Snapshot file consumed by the mobile client
pub const SNAPSHOT_FILE_NAME: &str = "latest.json";
/// Record of the document URLs used for the last published snapshot
pub const PROCESSED_RECORD_FILE_NAME: &str = "last_processed_urls.json";
/// Prefix of the timestamped snapshot copies kept for history
pub const HISTORY_FILE_PREFIX: &str = "shops_";

/// Snapshot format version.
/// Bump only on breaking schema changes; additive fields keep the version.
pub const DATA_VERSION: &str = "2.0";

/// Default listing page that links to the certificate PDFs
pub const DEFAULT_SEARCH_URL: &str = "https://happy-kaimonoken.info/tenposearch/";
/// Origin used to absolutize relative links found on the listing page
pub const DEFAULT_BASE_URL: &str = "https://happy-kaimonoken.info";
/// Default extraction model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Gemini REST API root
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Google Maps Geocoding API root
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

/// Per-call network timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Listing-page fetch timeout in seconds
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);
/// Geocoding request timeout in seconds
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum AI calls per run.
/// The free tier allows 50 per day; 45 leaves room for a manual forced run.
pub const DEFAULT_MAX_API_CALLS: u32 = 45;
/// Pause between two documents, in milliseconds
pub const DEFAULT_DOCUMENT_DELAY_MS: u64 = 3000;
/// Pause between two geocoding requests, in milliseconds
pub const DEFAULT_GEOCODE_DELAY_MS: u64 = 100;

/// Largest PDF accepted for extraction (20MB, the inline-data limit of the API)
pub const MAX_DOCUMENT_BYTES: usize = 20 * 1024 * 1024;
/// Characters of a model response shown in debug logs
pub const MAX_RESPONSE_PREVIEW_CHARS: usize = 300;

// Retry strategy for transient AI errors (rate limit, overload)
/// Delay unit in milliseconds; retries wait 2, 4, 8... units (10s, 20s, ...)
pub const RETRY_DELAY_UNIT_MS: u64 = 5_000;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 60;
/// Retries after the initial attempt (3 attempts in total)
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_SERVICE_UNAVAILABLE: u16 = 503;
