//! Minimal Gemini `generateContent` client.
//!
//! Sends one PDF (inline, base64) plus an instruction and returns the text of
//! the first candidate. Enforces the per-run call budget and retries transient
//! failures with exponential backoff.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_retry::RetryIf;

use crate::config::{MAX_RESPONSE_PREVIEW_CHARS, RETRY_DELAY_UNIT_MS};
use crate::error_handling::{get_retry_strategy, ExtractionError};

const PDF_MIME_TYPE: &str = "application/pdf";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client bound to one model and one call budget.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_calls: u32,
    calls_made: AtomicU32,
    retry_unit_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize, Serialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_calls: u32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            max_calls,
            calls_made: AtomicU32::new(0),
            retry_unit_ms: RETRY_DELAY_UNIT_MS,
        }
    }

    /// Overrides the backoff unit (retries wait 2, 4, ... units).
    pub fn with_retry_unit_ms(mut self, unit_ms: u64) -> Self {
        self.retry_unit_ms = unit_ms;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Successful calls made so far in this run.
    pub fn calls_made(&self) -> u32 {
        self.calls_made.load(Ordering::SeqCst)
    }

    /// Asks the model about a PDF and returns the response text.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` once the call budget is spent (checked before each attempt)
    /// - `Api`/`Request` for service failures that persisted through the retries
    /// - `Malformed` when the response carries no text
    pub async fn generate_with_pdf(
        &self,
        pdf: &[u8],
        prompt: &str,
    ) -> Result<String, ExtractionError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inline_data": { "mime_type": PDF_MIME_TYPE, "data": STANDARD.encode(pdf) } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.1
            }
        });

        RetryIf::spawn(
            get_retry_strategy(self.retry_unit_ms),
            || self.generate_once(&body),
            |e: &ExtractionError| {
                let transient = e.is_transient();
                if transient {
                    warn!("Transient AI error, backing off: {}", e);
                }
                transient
            },
        )
        .await
    }

    async fn generate_once(&self, body: &serde_json::Value) -> Result<String, ExtractionError> {
        let used = self.calls_made();
        if used >= self.max_calls {
            return Err(ExtractionError::QuotaExceeded {
                used,
                limit: self.max_calls,
            });
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        info!(
            "Sending request to {} (call {}/{})",
            self.model,
            used + 1,
            self.max_calls
        );
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| {
                    if envelope.error.status.is_empty() {
                        envelope.error.message
                    } else {
                        format!("{} ({})", envelope.error.message, envelope.error.status)
                    }
                })
                .unwrap_or(text);
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        self.calls_made.fetch_add(1, Ordering::SeqCst);

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ExtractionError::Malformed("response has no candidates".into()))?;
        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExtractionError::Malformed(format!(
                "response has no text (finish reason: {})",
                if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
            )));
        }
        if finish_reason == "MAX_TOKENS" {
            warn!("Response was cut off at the output token limit");
        }

        debug!(
            "Received response ({} chars): {}",
            text.len(),
            text.chars()
                .take(MAX_RESPONSE_PREVIEW_CHARS)
                .collect::<String>()
                .replace('\n', " ")
        );
        Ok(text)
    }
}
