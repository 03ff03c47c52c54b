//! Listing-page parsing.
//!
//! Finds the roster PDF links in the listing page HTML, both in anchors and in
//! inline scripts (the site sometimes builds its download buttons in JS).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

// CSS selector strings
const ANCHOR_SELECTOR_STR: &str = "a[href]";
const SCRIPT_SELECTOR_STR: &str = "script";

// Regex patterns
const SCRIPT_PDF_URL_PATTERN: &str = r#"https?://[^\s"']+\.pdf"#;

/// Path segment all roster uploads live under
const UPLOADS_PATH_MARKER: &str = "wp-content/uploads";
/// File-name keywords of the two roster kinds
const ROSTER_KEYWORDS: &[&str] = &["tempo", "daiten"];

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(ANCHOR_SELECTOR_STR).expect("Failed to parse anchor selector - this is a bug")
});

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(SCRIPT_SELECTOR_STR).expect("Failed to parse script selector - this is a bug")
});

static SCRIPT_PDF_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SCRIPT_PDF_URL_PATTERN).expect("Failed to compile PDF URL regex - this is a bug")
});

/// Whether a link points at one of the roster PDFs.
pub fn is_roster_pdf(href: &str) -> bool {
    let lower = href.to_lowercase();
    lower.ends_with(".pdf")
        && lower.contains(UPLOADS_PATH_MARKER)
        && ROSTER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Extracts the roster PDF URLs from a listing page.
///
/// Relative links are resolved against `base`. The result is de-duplicated and
/// sorted, so two fetches of the same page compare equal.
pub fn extract_pdf_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut found = BTreeSet::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if !is_roster_pdf(href) {
            continue;
        }
        match base.join(href) {
            Ok(absolute) => {
                log::debug!("Found PDF: {}", absolute);
                found.insert(absolute.to_string());
            }
            Err(e) => log::debug!("Skipping unresolvable link {}: {}", href, e),
        }
    }

    for element in document.select(&SCRIPT_SELECTOR) {
        let script = element.text().collect::<String>();
        for m in SCRIPT_PDF_URL.find_iter(&script) {
            if is_roster_pdf(m.as_str()) && found.insert(m.as_str().to_string()) {
                log::debug!("Found PDF in script: {}", m.as_str());
            }
        }
    }

    found.into_iter().collect()
}
