//! Error categorization and retry strategy.
//!
//! This module decides which transport failures are worth another attempt and
//! configures the backoff used for those attempts.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{
    HTTP_STATUS_SERVICE_UNAVAILABLE, HTTP_STATUS_TOO_MANY_REQUESTS, RETRY_MAX_ATTEMPTS,
    RETRY_MAX_DELAY_SECS,
};

/// Creates an exponential backoff retry strategy.
///
/// Delays are 2, 4, 8... times `unit_ms`, capped at `RETRY_MAX_DELAY_SECS`,
/// for at most `RETRY_MAX_ATTEMPTS` retries after the initial attempt.
///
/// # Returns
///
/// A retry strategy iterator ready for use with `tokio_retry::RetryIf`.
pub fn get_retry_strategy(unit_ms: u64) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(unit_ms)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(RETRY_MAX_ATTEMPTS)
}

/// Determines if a `reqwest::Error` is transient.
///
/// Timeouts, connection failures, 429 and 5xx responses are transient;
/// other 4xx responses, redirect loops and decode errors are permanent.
pub fn is_transient_reqwest(error: &reqwest::Error) -> bool {
    if let Some(status) = error.status() {
        return is_transient_status(status.as_u16());
    }
    if error.is_redirect() || error.is_decode() || error.is_builder() {
        return false;
    }
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

/// Determines if an HTTP status code is worth retrying.
pub fn is_transient_status(status: u16) -> bool {
    status == HTTP_STATUS_TOO_MANY_REQUESTS
        || status == HTTP_STATUS_SERVICE_UNAVAILABLE
        || (500..600).contains(&status)
}
