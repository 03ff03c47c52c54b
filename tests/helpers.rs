// Shared test helpers: fake collaborators and test data.
//
// The fakes implement the library's collaborator traits so orchestration
// scenarios run without network access.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use shopmap::config::PROCESSED_RECORD_FILE_NAME;
use shopmap::{
    save_record, Coordinate, DiscoveryError, Document, ExtractionError, GeocodeError,
    ProcessedUrlRecord, ShopExtractor, ShopRecord, SourceDiscovery,
};

pub const SMALL_V1: &str = "https://happy-kaimonoken.info/wp-content/uploads/2025/07/tempo_250714.pdf";
pub const SMALL_V2: &str = "https://happy-kaimonoken.info/wp-content/uploads/2025/08/tempo_250801.pdf";
#[allow(dead_code)] // Used by other test files
pub const LARGE_V1: &str = "https://happy-kaimonoken.info/wp-content/uploads/2025/06/daiten_250616.pdf";

/// Builds a shop record with the fields tests care about.
#[allow(dead_code)] // Used by other test files
pub fn shop(name: &str, address: &str) -> ShopRecord {
    ShopRecord {
        name: name.to_string(),
        address: address.to_string(),
        phone_number: None,
        business_category: "その他の小売業".to_string(),
        business_category_code: 7,
        district: "銀座".to_string(),
        is_large_retailer: false,
        special_market: None,
        certificate_type: "中小小売店(全券種)".to_string(),
        coordinate: None,
    }
}

/// Writes a processed-URL record as a previous successful run would have.
#[allow(dead_code)] // Used by other test files
pub fn seed_record(data_dir: &Path, urls: &[&str]) {
    let record = ProcessedUrlRecord::from_urls(urls, Utc::now());
    save_record(&data_dir.join(PROCESSED_RECORD_FILE_NAME), &record)
        .expect("Failed to seed processed-URL record");
}

/// Discovery returning a fixed list, or failing.
pub struct FakeDiscovery {
    urls: Option<Vec<String>>,
}

#[allow(dead_code)] // Used by other test files
impl FakeDiscovery {
    pub fn returning(urls: &[&str]) -> Self {
        Self {
            urls: Some(urls.iter().map(|u| u.to_string()).collect()),
        }
    }

    pub fn failing() -> Self {
        Self { urls: None }
    }
}

#[async_trait]
impl SourceDiscovery for FakeDiscovery {
    async fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        match &self.urls {
            Some(urls) => Ok(urls.clone()),
            None => Err(DiscoveryError::Status(503)),
        }
    }

    fn source(&self) -> &str {
        "https://happy-kaimonoken.info/tenposearch/"
    }
}

/// Extractor returning canned shops per URL.
///
/// URLs without canned shops get one generic shop. A URL registered with
/// `failing_on` returns a permanent error.
#[derive(Default)]
pub struct FakeExtractor {
    shops: HashMap<String, Vec<ShopRecord>>,
    failing_url: Option<String>,
    geocode_error: bool,
    pub extracted: Arc<Mutex<Vec<String>>>,
    pub geocode_calls: Arc<AtomicUsize>,
    /// Names of every record passed to `geocode`
    pub geocoded: Arc<Mutex<Vec<String>>>,
    calls: AtomicU32,
}

#[allow(dead_code)] // Used by other test files
impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shops(mut self, url: &str, shops: Vec<ShopRecord>) -> Self {
        self.shops.insert(url.to_string(), shops);
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing_url = Some(url.to_string());
        self
    }

    pub fn failing_geocode(mut self) -> Self {
        self.geocode_error = true;
        self
    }
}

#[async_trait]
impl ShopExtractor for FakeExtractor {
    async fn extract(&self, document: &Document) -> Result<Vec<ShopRecord>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.extracted
            .lock()
            .expect("extracted list poisoned")
            .push(document.url.clone());
        if self.failing_url.as_deref() == Some(document.url.as_str()) {
            return Err(ExtractionError::Api {
                status: 403,
                message: "API key not valid".to_string(),
            });
        }
        Ok(self
            .shops
            .get(&document.url)
            .cloned()
            .unwrap_or_else(|| vec![shop("汎用商店", "銀座1-1-1")]))
    }

    async fn geocode(&self, mut shops: Vec<ShopRecord>) -> Result<Vec<ShopRecord>, GeocodeError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.geocoded
            .lock()
            .expect("geocoded list poisoned")
            .extend(shops.iter().map(|s| s.name.clone()));
        if self.geocode_error {
            return Err(GeocodeError::Api {
                status: "REQUEST_DENIED".to_string(),
                message: None,
            });
        }
        for shop in &mut shops {
            shop.coordinate = Some(Coordinate::new(35.6719, 139.7658));
        }
        Ok(shops)
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    fn coordinate_method(&self) -> &str {
        "fixed"
    }

    fn api_calls_used(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}
