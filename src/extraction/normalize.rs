//! Conversion of raw model entries into `ShopRecord`s.
//!
//! The model output is loosely typed: codes arrive as numbers or strings,
//! optional fields as `null`, `""` or missing. Everything is coerced here so
//! the rest of the crate only sees well-formed records.

use serde_json::Value;

use crate::catalog::{
    business_category_code, is_known_category_code, DEFAULT_BUSINESS_CATEGORY,
    DEFAULT_BUSINESS_CATEGORY_CODE,
};
use crate::models::{Document, ShopRecord};

/// Result of normalising one response.
#[derive(Debug, Default)]
pub struct Normalized {
    pub shops: Vec<ShopRecord>,
    /// Entries dropped because they were not objects or had no name
    pub skipped: usize,
}

/// Normalises model entries for a document.
///
/// The large-retailer flag always comes from the document category; the
/// certificate label does too unless the model returned one.
pub fn normalize_entries(entries: Vec<Value>, document: &Document) -> Normalized {
    let mut out = Normalized::default();
    for (i, entry) in entries.into_iter().enumerate() {
        match normalize_entry(&entry, document) {
            Some(shop) => {
                log::trace!("Shop {}: {}", i + 1, shop.name);
                out.shops.push(shop);
            }
            None => {
                log::debug!("Skipped invalid entry {}: {}", i + 1, entry);
                out.skipped += 1;
            }
        }
    }
    out
}

fn normalize_entry(entry: &Value, document: &Document) -> Option<ShopRecord> {
    let object = entry.as_object()?;
    let name = non_empty_str(object.get("name"))?;

    let business_category = non_empty_str(object.get("businessCategory"))
        .unwrap_or_else(|| DEFAULT_BUSINESS_CATEGORY.to_string());
    let business_category_code = category_code(object.get("businessCategoryCode"))
        .or_else(|| business_category_code(&business_category))
        .unwrap_or(DEFAULT_BUSINESS_CATEGORY_CODE);

    Some(ShopRecord {
        name,
        address: non_empty_str(object.get("address")).unwrap_or_default(),
        phone_number: non_empty_str(object.get("phoneNumber")),
        business_category,
        business_category_code,
        district: non_empty_str(object.get("district")).unwrap_or_default(),
        is_large_retailer: document.category.is_large_retailer(),
        special_market: non_empty_str(object.get("specialMarket")),
        certificate_type: non_empty_str(object.get("certificateType"))
            .unwrap_or_else(|| document.category.certificate_type().to_string()),
        coordinate: None,
    })
}

/// Trimmed string value; `None` for null, non-strings and blank strings.
fn non_empty_str(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(s.to_string())
    }
}

/// A known category code given as a number or a numeric string.
fn category_code(value: Option<&Value>) -> Option<u8> {
    let code = match value? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    let code = u8::try_from(code).ok()?;
    is_known_category_code(code).then_some(code)
}
