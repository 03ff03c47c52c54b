//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client shared by discovery, extraction and geocoding.
///
/// Creates a `reqwest::Client` configured with:
/// - A browser User-Agent (the listing page serves bots differently)
/// - The per-call timeout from the configuration
/// - Redirect following (reqwest default, up to 10 hops)
///
/// Individual requests may set a shorter timeout.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(DEFAULT_USER_AGENT)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_default_config() {
        assert!(init_client(&Config::default()).is_ok());
    }
}
