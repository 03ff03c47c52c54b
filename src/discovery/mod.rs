//! Source discovery: locating the current roster PDFs.
//!
//! The listing page is an external, untrusted feed. Callers treat every
//! `DiscoveryError` as "nothing discovered" rather than as a run failure.

mod parse;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use url::Url;

use crate::config::{DISCOVERY_ACCEPT, DISCOVERY_ACCEPT_LANGUAGE};
use crate::error_handling::DiscoveryError;

pub use parse::{extract_pdf_urls, is_roster_pdf};

/// Yields the document URLs currently published by the source.
#[async_trait]
pub trait SourceDiscovery: Send + Sync {
    /// Returns absolute, de-duplicated, sorted document URLs.
    async fn discover(&self) -> Result<Vec<String>, DiscoveryError>;

    /// Where documents are discovered from, recorded in snapshot metadata.
    fn source(&self) -> &str;
}

/// Discovery by fetching and parsing the listing page over HTTP.
pub struct HttpDiscovery {
    client: reqwest::Client,
    search_url: String,
    base_url: Url,
    timeout: Duration,
}

impl HttpDiscovery {
    /// Creates a discovery for `search_url`, resolving relative links against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::InvalidUrl` if `base_url` does not parse.
    pub fn new(
        client: reqwest::Client,
        search_url: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let base_url = Url::parse(base_url).map_err(|source| DiscoveryError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            client,
            search_url: search_url.into(),
            base_url,
            timeout,
        })
    }
}

#[async_trait]
impl SourceDiscovery for HttpDiscovery {
    async fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        info!("Discovering PDF URLs from {}", self.search_url);

        let response = self
            .client
            .get(&self.search_url)
            .header(ACCEPT, DISCOVERY_ACCEPT)
            .header(ACCEPT_LANGUAGE, DISCOVERY_ACCEPT_LANGUAGE)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        debug!("Received listing page ({} chars)", html.len());

        let urls = extract_pdf_urls(&html, &self.base_url);
        info!("Discovered {} PDF URL{}", urls.len(), if urls.len() == 1 { "" } else { "s" });
        Ok(urls)
    }

    fn source(&self) -> &str {
        &self.search_url
    }
}
