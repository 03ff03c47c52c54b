//! Google Maps geocoding with district fallbacks.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::catalog::{district_centroid, is_in_tokyo, DEFAULT_COORDINATE};
use crate::config::DEFAULT_GEOCODE_DELAY_MS;
use crate::error_handling::{DiagnosticType, GeocodeError, RunDiagnostics};
use crate::models::{Coordinate, ShopRecord};

/// Coordinate method when a geocoding key is configured.
pub const GOOGLE_GEOCODING_METHOD: &str = "google-maps-geocoding";
/// Coordinate method when every record uses the district table.
pub const DISTRICT_CENTROID_METHOD: &str = "district-centroid";

const ADDRESS_SUFFIX: &str = "中央区, 東京都, 日本";
const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by the Google Maps Geocoding API.
///
/// Without an API key no request is made and every record gets its
/// district centroid.
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    delay: Duration,
    diagnostics: Arc<RunDiagnostics>,
}

impl GoogleGeocoder {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        diagnostics: Arc<RunDiagnostics>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            delay: Duration::from_millis(DEFAULT_GEOCODE_DELAY_MS),
            diagnostics,
        }
    }

    /// Pause between consecutive API requests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn coordinate_method(&self) -> &'static str {
        if self.api_key.is_some() {
            GOOGLE_GEOCODING_METHOD
        } else {
            DISTRICT_CENTROID_METHOD
        }
    }

    /// Sets `coordinate` on every record that does not have one yet.
    ///
    /// # Errors
    ///
    /// Transport failures and refused requests (`REQUEST_DENIED`,
    /// `OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...) abort with `GeocodeError`.
    /// `ZERO_RESULTS` and results outside Tokyo fall back per record.
    pub async fn geocode_all(
        &self,
        mut shops: Vec<ShopRecord>,
    ) -> Result<Vec<ShopRecord>, GeocodeError> {
        match self.api_key {
            Some(_) => info!("Geocoding {} shops with Google Maps", shops.len()),
            None => warn!("No Google Maps API key, using district coordinates only"),
        }

        let mut requested = false;
        for shop in shops.iter_mut().filter(|s| s.coordinate.is_none()) {
            let located = match (&self.api_key, query_for(shop)) {
                (Some(key), Some(query)) => {
                    if requested && !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    requested = true;
                    self.lookup(key, &query).await?
                }
                _ => None,
            };

            shop.coordinate = Some(match located {
                Some(coordinate) => {
                    self.diagnostics.increment(DiagnosticType::Geocoded);
                    coordinate
                }
                None => fallback_coordinate(&shop.district, &self.diagnostics),
            });
        }

        info!(
            "Geocoding complete: {} geocoded, {} district, {} default",
            self.diagnostics.get(DiagnosticType::Geocoded),
            self.diagnostics.get(DiagnosticType::DistrictFallback),
            self.diagnostics.get(DiagnosticType::DefaultCoordinateFallback)
        );
        Ok(shops)
    }

    async fn lookup(&self, key: &str, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!("{}/json", self.base_url);
        let response: GeocodeResponse = self
            .http
            .get(&url)
            .query(&[("address", query), ("key", key), ("language", "ja")])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status.as_str() {
            STATUS_OK => {
                let Some(result) = response.results.into_iter().next() else {
                    self.diagnostics.increment(DiagnosticType::GeocodeNoResult);
                    return Ok(None);
                };
                let coordinate =
                    Coordinate::new(result.geometry.location.lat, result.geometry.location.lng);
                if is_in_tokyo(&coordinate) {
                    debug!(
                        "{} -> {}, {}",
                        query, coordinate.latitude, coordinate.longitude
                    );
                    Ok(Some(coordinate))
                } else {
                    warn!(
                        "Geocode result for {} is outside Tokyo ({}, {})",
                        query, coordinate.latitude, coordinate.longitude
                    );
                    self.diagnostics.increment(DiagnosticType::GeocodeOutOfArea);
                    Ok(None)
                }
            }
            STATUS_ZERO_RESULTS => {
                debug!("No geocoding result for {}", query);
                self.diagnostics.increment(DiagnosticType::GeocodeNoResult);
                Ok(None)
            }
            _ => Err(GeocodeError::Api {
                status: response.status,
                message: response.error_message,
            }),
        }
    }
}

/// Address query for a record; the district stands in for a missing address.
fn query_for(shop: &ShopRecord) -> Option<String> {
    let address = shop.address.trim();
    let place = if address.is_empty() {
        shop.district.trim()
    } else {
        address
    };
    (!place.is_empty()).then(|| format!("{place}, {ADDRESS_SUFFIX}"))
}

/// District centroid for `district`, or the central Chuo coordinate.
pub fn fallback_coordinate(district: &str, diagnostics: &RunDiagnostics) -> Coordinate {
    match district_centroid(district) {
        Some((name, coordinate)) => {
            if name != district.trim() {
                debug!("District {} matched {}", district, name);
            }
            diagnostics.increment(DiagnosticType::DistrictFallback);
            coordinate
        }
        None => {
            diagnostics.increment(DiagnosticType::DefaultCoordinateFallback);
            DEFAULT_COORDINATE
        }
    }
}
