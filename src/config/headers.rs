//! HTTP header values for listing-page requests.
//!
//! The listing page is served by a WordPress site that answers differently to
//! non-browser clients, so discovery requests look like a desktop browser.

/// Accept header sent with listing-page requests
pub const DISCOVERY_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
/// Accept-Language header; the listing page is Japanese
pub const DISCOVERY_ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.7,en;q=0.3";

/// User-Agent header for every outgoing request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
