//! Data model shared by the tracker, the extractor and the publisher.
//!
//! Field names serialize in camelCase because the mobile client reads the
//! snapshot as-is; additive changes only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CERTIFICATE_LARGE_RETAILER, CERTIFICATE_SMALL_MEDIUM};

/// Kind of roster a certificate document lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    /// Small and medium retailers; accepts every certificate type
    #[serde(rename = "small")]
    SmallMedium,
    /// Large retailers; accepts only the blue certificate
    #[serde(rename = "large")]
    Large,
}

impl DocumentCategory {
    /// Classifies a document URL.
    ///
    /// The site names rosters `tempo_*.pdf` (shops) and `daiten_*.pdf` (large
    /// stores). Anything unrecognised is treated as a small/medium roster.
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("tempo") {
            DocumentCategory::SmallMedium
        } else if lower.contains("daiten") {
            DocumentCategory::Large
        } else if url.contains("中小") || lower.contains("small") {
            DocumentCategory::SmallMedium
        } else if url.contains("大規模") || lower.contains("large") {
            DocumentCategory::Large
        } else {
            DocumentCategory::SmallMedium
        }
    }

    /// Certificate-type label attached to every shop of this roster.
    pub fn certificate_type(&self) -> &'static str {
        match self {
            DocumentCategory::SmallMedium => CERTIFICATE_SMALL_MEDIUM,
            DocumentCategory::Large => CERTIFICATE_LARGE_RETAILER,
        }
    }

    pub fn is_large_retailer(&self) -> bool {
        matches!(self, DocumentCategory::Large)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::SmallMedium => "small",
            DocumentCategory::Large => "large",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered PDF together with its roster category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub category: DocumentCategory,
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let category = DocumentCategory::from_url(&url);
        Self { url, category }
    }
}

/// WGS84 position of a shop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One shop accepting the certificates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub business_category: String,
    pub business_category_code: u8,
    #[serde(default)]
    pub district: String,
    pub is_large_retailer: bool,
    #[serde(default)]
    pub special_market: Option<String>,
    pub certificate_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

/// Metadata describing how a snapshot was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadata {
    pub model: String,
    pub discovery_url: String,
    pub processing_time: DateTime<Utc>,
    pub api_calls_used: u32,
    pub coordinate_method: String,
}

/// The published artifact read by the mobile client.
///
/// `total_shops == shops.len()` and every processed URL is also a discovered
/// URL; `build_snapshot` is the only constructor in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub last_updated: DateTime<Utc>,
    pub data_version: String,
    pub total_shops: usize,
    #[serde(rename = "processedPDFs")]
    pub processed_pdfs: Vec<String>,
    #[serde(rename = "discoveredPDFs")]
    pub discovered_pdfs: Vec<String>,
    pub shops: Vec<ShopRecord>,
    pub processing_metadata: ProcessingMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_site_urls() {
        assert_eq!(
            DocumentCategory::from_url(
                "https://happy-kaimonoken.info/wp-content/uploads/2025/07/tempo_250714.pdf"
            ),
            DocumentCategory::SmallMedium
        );
        assert_eq!(
            DocumentCategory::from_url(
                "https://happy-kaimonoken.info/wp-content/uploads/2025/06/DAITEN_250616.pdf"
            ),
            DocumentCategory::Large
        );
    }

    #[test]
    fn test_category_fallback_keywords() {
        assert_eq!(
            DocumentCategory::from_url("https://example.com/大規模店舗.pdf"),
            DocumentCategory::Large
        );
        assert_eq!(
            DocumentCategory::from_url("https://example.com/large-stores.pdf"),
            DocumentCategory::Large
        );
        assert_eq!(
            DocumentCategory::from_url("https://example.com/中小.pdf"),
            DocumentCategory::SmallMedium
        );
        assert_eq!(
            DocumentCategory::from_url("v1.pdf"),
            DocumentCategory::SmallMedium
        );
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(
            DocumentCategory::SmallMedium.certificate_type(),
            "中小小売店(全券種)"
        );
        assert_eq!(
            DocumentCategory::Large.certificate_type(),
            "大規模小売店(青色券)"
        );
        assert!(DocumentCategory::Large.is_large_retailer());
        assert!(!DocumentCategory::SmallMedium.is_large_retailer());
    }

    #[test]
    fn test_shop_record_wire_names() {
        let shop = ShopRecord {
            name: "築地 魚河岸".into(),
            address: "築地6-26-1".into(),
            phone_number: Some("03-1234-5678".into()),
            business_category: "飲食料品小売業".into(),
            business_category_code: 3,
            district: "築地".into(),
            is_large_retailer: false,
            special_market: Some("築地魚河岸".into()),
            certificate_type: "中小小売店(全券種)".into(),
            coordinate: Some(Coordinate::new(35.6654, 139.7707)),
        };
        let value = serde_json::to_value(&shop).expect("serialize");
        assert_eq!(value["phoneNumber"], "03-1234-5678");
        assert_eq!(value["businessCategoryCode"], 3);
        assert_eq!(value["isLargeRetailer"], false);
        assert_eq!(value["specialMarket"], "築地魚河岸");
        assert_eq!(value["coordinate"]["latitude"], 35.6654);
    }

    #[test]
    fn test_category_serializes_as_short_key() {
        assert_eq!(
            serde_json::to_string(&DocumentCategory::SmallMedium).expect("serialize"),
            "\"small\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentCategory::Large).expect("serialize"),
            "\"large\""
        );
    }
}
