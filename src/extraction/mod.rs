//! Extraction and geocoding capability.
//!
//! The orchestrator only sees `ShopExtractor`; the Gemini/Google pair in
//! `backend` is the production implementation.

mod backend;
mod gemini;
mod geocode;
mod normalize;
mod prompt;
mod repair;

use async_trait::async_trait;

use crate::error_handling::{ExtractionError, GeocodeError};
use crate::models::{Document, ShopRecord};

pub use backend::GeminiBackend;
pub use gemini::GeminiClient;
pub use geocode::{
    fallback_coordinate, GoogleGeocoder, DISTRICT_CENTROID_METHOD, GOOGLE_GEOCODING_METHOD,
};
pub use normalize::{normalize_entries, Normalized};
pub use prompt::extraction_prompt;
pub use repair::{parse_entries, strip_code_fences, ParsedEntries};

/// Turns roster documents into geocoded shop records.
#[async_trait]
pub trait ShopExtractor: Send + Sync {
    /// Extracts the shops listed in one document.
    ///
    /// Returned records carry no coordinate yet.
    async fn extract(&self, document: &Document) -> Result<Vec<ShopRecord>, ExtractionError>;

    /// Assigns a coordinate to every record, in order.
    async fn geocode(&self, shops: Vec<ShopRecord>) -> Result<Vec<ShopRecord>, GeocodeError>;

    /// Identifier of the model doing the extraction.
    fn model(&self) -> &str;

    /// How coordinates are obtained, recorded in the snapshot metadata.
    fn coordinate_method(&self) -> &str;

    /// AI calls spent so far in this run.
    fn api_calls_used(&self) -> u32;
}
