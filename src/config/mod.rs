//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (file names, limits, retry parameters)
//! - HTTP header values sent to the listing page
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
