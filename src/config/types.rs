//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_DOCUMENT_DELAY_MS, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEOCODE_BASE_URL, DEFAULT_GEOCODE_DELAY_MS, DEFAULT_MAX_API_CALLS, DEFAULT_MODEL,
    DEFAULT_SEARCH_URL, DEFAULT_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run configuration.
///
/// Used both as the CLI definition and as the library configuration; every
/// field has a default so it can be built with `..Default::default()`.
///
/// # Examples
///
/// ```no_run
/// use shopmap::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/srv/shopmap/data"),
///     force: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shopmap",
    version,
    about = "Publishes the shop snapshot for the merchant-certificate map"
)]
pub struct Config {
    /// Process the documents even when the discovered URLs are unchanged
    #[arg(long, env = "FORCE_PROCESSING")]
    pub force: bool,

    /// Directory holding the snapshot, the processed-URL record and history copies
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Listing page that links to the certificate PDFs
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Origin used to absolutize relative PDF links
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Google Maps Geocoding API key; district centroids are used without it
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_maps_api_key: Option<String>,

    /// Extraction model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini REST API root
    #[arg(long, default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Geocoding REST API root
    #[arg(long, default_value = DEFAULT_GEOCODE_BASE_URL)]
    pub geocode_base_url: String,

    /// Per-call timeout in seconds for document downloads and AI calls
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum AI calls per run
    #[arg(long, default_value_t = DEFAULT_MAX_API_CALLS)]
    pub max_api_calls: u32,

    /// Pause between documents in milliseconds
    #[arg(long, default_value_t = DEFAULT_DOCUMENT_DELAY_MS)]
    pub document_delay_ms: u64,

    /// Pause between geocoding requests in milliseconds
    #[arg(long, default_value_t = DEFAULT_GEOCODE_DELAY_MS)]
    pub geocode_delay_ms: u64,

    /// Skip the timestamped history copy of each published snapshot
    #[arg(long = "no-history", action = clap::ArgAction::SetFalse)]
    pub keep_history: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn document_delay(&self) -> Duration {
        Duration::from_millis(self.document_delay_ms)
    }

    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force: false,
            data_dir: PathBuf::from("data"),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            gemini_api_key: None,
            google_maps_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_api_calls: DEFAULT_MAX_API_CALLS,
            document_delay_ms: DEFAULT_DOCUMENT_DELAY_MS,
            geocode_delay_ms: DEFAULT_GEOCODE_DELAY_MS,
            keep_history: true,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
