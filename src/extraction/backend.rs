//! Production `ShopExtractor`: Gemini for extraction, Google Maps for coordinates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::gemini::GeminiClient;
use super::geocode::GoogleGeocoder;
use super::normalize::normalize_entries;
use super::prompt::extraction_prompt;
use super::repair::parse_entries;
use super::ShopExtractor;
use crate::config::{Config, GEOCODE_TIMEOUT, MAX_DOCUMENT_BYTES};
use crate::error_handling::{
    DiagnosticType, ExtractionError, GeocodeError, InitializationError, RunDiagnostics,
};
use crate::models::{Document, ShopRecord};

/// Extractor that downloads each roster and sends it to Gemini.
pub struct GeminiBackend {
    http: reqwest::Client,
    gemini: GeminiClient,
    geocoder: GoogleGeocoder,
    diagnostics: Arc<RunDiagnostics>,
    timeout: Duration,
}

impl GeminiBackend {
    pub fn new(
        http: reqwest::Client,
        gemini: GeminiClient,
        geocoder: GoogleGeocoder,
        diagnostics: Arc<RunDiagnostics>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            gemini,
            geocoder,
            diagnostics,
            timeout,
        }
    }

    /// Builds the backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::MissingApiKeyError` when no Gemini key is set.
    pub fn from_config(
        config: &Config,
        http: reqwest::Client,
        diagnostics: Arc<RunDiagnostics>,
    ) -> Result<Self, InitializationError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(InitializationError::MissingApiKeyError("GEMINI_API_KEY"))?;

        let gemini = GeminiClient::new(
            http.clone(),
            config.gemini_base_url.as_str(),
            api_key,
            config.model.as_str(),
            config.timeout(),
            config.max_api_calls,
        );
        let geocoder = GoogleGeocoder::new(
            http.clone(),
            config.geocode_base_url.as_str(),
            config.google_maps_api_key.clone(),
            GEOCODE_TIMEOUT,
            Arc::clone(&diagnostics),
        )
        .with_delay(config.geocode_delay());

        Ok(Self::new(http, gemini, geocoder, diagnostics, config.timeout()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ExtractionError> {
        let download_error = |source: reqwest::Error| ExtractionError::Download {
            url: url.to_string(),
            source,
        };
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(download_error)?;

        if let Some(declared) = response.content_length() {
            let declared = usize::try_from(declared).unwrap_or(usize::MAX);
            if declared > MAX_DOCUMENT_BYTES {
                return Err(ExtractionError::TooLarge {
                    url: url.to_string(),
                    bytes: declared,
                });
            }
        }
        let bytes = response.bytes().await.map_err(download_error)?;

        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ExtractionError::TooLarge {
                url: url.to_string(),
                bytes: bytes.len(),
            });
        }
        debug!("Downloaded {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ShopExtractor for GeminiBackend {
    async fn extract(&self, document: &Document) -> Result<Vec<ShopRecord>, ExtractionError> {
        info!(
            "Processing {} ({})",
            document.url,
            document.category.certificate_type()
        );
        let pdf = self.download(&document.url).await?;
        let prompt = extraction_prompt(document.category);
        let response = self.gemini.generate_with_pdf(&pdf, &prompt).await?;

        let parsed = parse_entries(&response)?;
        if parsed.repaired {
            self.diagnostics.increment(DiagnosticType::RepairedResponse);
        }
        let normalized = normalize_entries(parsed.entries, document);
        if normalized.skipped > 0 {
            warn!(
                "Skipped {} entries without a name in {}",
                normalized.skipped, document.url
            );
            self.diagnostics
                .add(DiagnosticType::UnnamedEntrySkipped, normalized.skipped);
        }
        if normalized.shops.is_empty() {
            return Err(ExtractionError::Empty {
                url: document.url.clone(),
            });
        }

        info!(
            "Extracted {} shops from {}",
            normalized.shops.len(),
            document.url
        );
        Ok(normalized.shops)
    }

    async fn geocode(&self, shops: Vec<ShopRecord>) -> Result<Vec<ShopRecord>, GeocodeError> {
        self.geocoder.geocode_all(shops).await
    }

    fn model(&self) -> &str {
        self.gemini.model()
    }

    fn coordinate_method(&self) -> &str {
        self.geocoder.coordinate_method()
    }

    fn api_calls_used(&self) -> u32 {
        self.gemini.calls_made()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_gemini_key() {
        let config = Config::default();
        let result = GeminiBackend::from_config(
            &config,
            reqwest::Client::new(),
            Arc::new(RunDiagnostics::new()),
        );
        assert!(matches!(
            result,
            Err(InitializationError::MissingApiKeyError("GEMINI_API_KEY"))
        ));

        let config = Config {
            gemini_api_key: Some("   ".into()),
            ..Config::default()
        };
        assert!(GeminiBackend::from_config(
            &config,
            reqwest::Client::new(),
            Arc::new(RunDiagnostics::new())
        )
        .is_err());
    }

    #[test]
    fn test_from_config_metadata() {
        let config = Config {
            gemini_api_key: Some("key".into()),
            ..Config::default()
        };
        let backend = GeminiBackend::from_config(
            &config,
            reqwest::Client::new(),
            Arc::new(RunDiagnostics::new()),
        )
        .expect("key is set");
        assert_eq!(backend.model(), "gemini-2.5-flash");
        assert_eq!(backend.coordinate_method(), "district-centroid");
        assert_eq!(backend.api_calls_used(), 0);
    }
}
