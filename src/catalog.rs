//! Reference data for Chuo City (中央区): business categories, districts and
//! their centroids, certificate labels.

use crate::models::Coordinate;

/// Certificate label for the small/medium retailer roster
pub const CERTIFICATE_SMALL_MEDIUM: &str = "中小小売店(全券種)";
/// Certificate label for the large retailer roster
pub const CERTIFICATE_LARGE_RETAILER: &str = "大規模小売店(青色券)";

/// Category used when the model does not return one
pub const DEFAULT_BUSINESS_CATEGORY: &str = "その他の小売業";
pub const DEFAULT_BUSINESS_CATEGORY_CODE: u8 = 7;

/// Business category labels and their numeric codes, as printed on the rosters.
pub const BUSINESS_CATEGORIES: &[(&str, u8)] = &[
    ("コンビニ、雑貨", 1),
    ("織物、衣類、身の回り品小売業", 2),
    ("飲食料品小売業", 3),
    ("自動車・オートバイ小売業", 4),
    ("家具・建具・畳小売業", 5),
    ("機械器具小売業", 6),
    ("その他の小売業", 7),
    ("宿泊業、飲食サービス業", 8),
    ("サービス業（他に分類されないもの）", 9),
    ("大規模小売店", 10),
];

/// Districts of Chuo City with an approximate centroid each.
pub const DISTRICTS: &[(&str, Coordinate)] = &[
    ("明石町", Coordinate::new(35.6640, 139.7720)),
    ("入船", Coordinate::new(35.6640, 139.7760)),
    ("勝どき", Coordinate::new(35.6590, 139.7780)),
    ("京橋", Coordinate::new(35.6750, 139.7700)),
    ("銀座", Coordinate::new(35.6719, 139.7658)),
    ("新川", Coordinate::new(35.6800, 139.7800)),
    ("日本橋", Coordinate::new(35.6833, 139.7736)),
    ("八重洲", Coordinate::new(35.6800, 139.7650)),
    ("築地", Coordinate::new(35.6654, 139.7707)),
    ("豊海町", Coordinate::new(35.6550, 139.7650)),
    ("佃", Coordinate::new(35.6600, 139.7820)),
    ("月島", Coordinate::new(35.6630, 139.7850)),
    ("晴海", Coordinate::new(35.6550, 139.7900)),
    ("東銀座", Coordinate::new(35.6690, 139.7680)),
];

/// Central Chuo City, used when neither geocoding nor the district helps
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(35.6762, 139.7649);

/// Accepted bounding box for geocoding results (latitude, longitude ranges)
pub const TOKYO_LATITUDE: (f64, f64) = (35.6, 35.8);
pub const TOKYO_LONGITUDE: (f64, f64) = (139.6, 139.9);

/// Code for a business category label, if the label is known.
pub fn business_category_code(label: &str) -> Option<u8> {
    BUSINESS_CATEGORIES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, code)| *code)
}

/// Whether a code is one of the known category codes.
pub fn is_known_category_code(code: u8) -> bool {
    BUSINESS_CATEGORIES.iter().any(|(_, c)| *c == code)
}

/// Names of all districts, for prompting.
pub fn district_names() -> Vec<&'static str> {
    DISTRICTS.iter().map(|(name, _)| *name).collect()
}

/// Centroid for a district name.
///
/// Exact match first, then the first district whose name contains or is
/// contained in `district` (so "銀座四丁目" finds 銀座).
pub fn district_centroid(district: &str) -> Option<(&'static str, Coordinate)> {
    let district = district.trim();
    if district.is_empty() {
        return None;
    }
    if let Some((name, coord)) = DISTRICTS.iter().find(|(name, _)| *name == district) {
        return Some((*name, *coord));
    }
    DISTRICTS
        .iter()
        .find(|(name, _)| district.contains(name) || name.contains(district))
        .map(|(name, coord)| (*name, *coord))
}

/// Whether a coordinate lies inside the accepted Tokyo box.
pub fn is_in_tokyo(coordinate: &Coordinate) -> bool {
    (TOKYO_LATITUDE.0..=TOKYO_LATITUDE.1).contains(&coordinate.latitude)
        && (TOKYO_LONGITUDE.0..=TOKYO_LONGITUDE.1).contains(&coordinate.longitude)
}
