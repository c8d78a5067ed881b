use crate::error::{kind_from_message, ErrorKind, ProviderError};
use crate::generator::{GenerationRequest, StructuredGenerator};
use crate::models::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const QUOTA_FAILURE_TYPE: &str = "google.rpc.QuotaFailure";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Base delay; doubles on every retry.
    pub retry_backoff: Duration,
    pub http_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_backoff: Duration::from_millis(500),
            http_timeout: Duration::from_secs(55),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(ms) = env::var("GEMINI_RETRY_BACKOFF_MS") {
            let ms: u64 = ms.parse().context("GEMINI_RETRY_BACKOFF_MS must be an integer")?;
            config.retry_backoff = Duration::from_millis(ms);
        }
        if let Ok(secs) = env::var("GEMINI_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("GEMINI_HTTP_TIMEOUT_SECS must be an integer")?;
            config.http_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

pub struct GeminiService {
    client: Client,
    config: GeminiConfig,
}

impl GeminiService {
    pub fn new() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env()?)
    }

    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// The API key goes in a header, never in the URL.
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_request(&self, request: &GenerationRequest<'_>) -> GeminiRequest {
        let data = base64::engine::general_purpose::STANDARD.encode(request.document);

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart::Text {
                        text: request.instruction.to_string(),
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiBlob {
                            mime_type: request.mime_type.to_string(),
                            data,
                        },
                    },
                ],
            }],
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            }),
        }
    }

    async fn generate_once(&self, body: &GeminiRequest) -> Result<serde_json::Value, ProviderError> {
        let response = self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(classify_error(status.as_u16(), &error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parse_response(&gemini_response)
    }
}

#[async_trait]
impl StructuredGenerator for GeminiService {
    async fn generate(
        &self,
        request: GenerationRequest<'_>,
    ) -> Result<serde_json::Value, ProviderError> {
        let body = self.build_request(&request);

        let mut attempt: u32 = 0;
        loop {
            match self.generate_once(&body).await {
                Ok(value) => {
                    if attempt > 0 {
                        log::info!("Gemini call succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < request.max_retries => {
                    attempt += 1;
                    let backoff = backoff_for(self.config.retry_backoff, attempt);
                    log::warn!(
                        "Gemini call failed ({}), retry {}/{} after {:?}",
                        e,
                        attempt,
                        request.max_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `base * 2^(attempt-1)`, saturating instead of overflowing.
fn backoff_for(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Turn a non-2xx Gemini reply into a typed error.
///
/// `RESOURCE_EXHAUSTED` covers both short-window rate limits and exhausted
/// quotas; the `QuotaFailure` detail's quota ids tell them apart. Bodies
/// without the JSON envelope are matched on their text.
pub fn classify_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => {
            let error = envelope.error;
            let exhausted = error.status.as_deref() == Some("RESOURCE_EXHAUSTED") || status == 429;
            if !exhausted {
                return ProviderError::Api {
                    status,
                    message: error.message,
                };
            }
            if error.has_detail_type(QUOTA_FAILURE_TYPE) && !is_short_window_quota(&error) {
                ProviderError::QuotaExceeded {
                    message: error.message,
                }
            } else {
                ProviderError::RateLimited {
                    message: error.message,
                }
            }
        }
        Err(_) => {
            let message = body.trim().to_string();
            match kind_from_message(&message) {
                ErrorKind::RateLimited => ProviderError::RateLimited { message },
                ErrorKind::QuotaExceeded => ProviderError::QuotaExceeded { message },
                _ if status == 429 => ProviderError::RateLimited { message },
                _ => ProviderError::Api { status, message },
            }
        }
    }
}

/// Every violated quota is a per-second or per-minute bucket.
fn is_short_window_quota(error: &GeminiErrorBody) -> bool {
    let quota_ids: Vec<&str> = error
        .details
        .iter()
        .filter(|d| {
            d.get("@type")
                .and_then(|t| t.as_str())
                .map(|t| t.ends_with(QUOTA_FAILURE_TYPE))
                .unwrap_or(false)
        })
        .filter_map(|d| d.get("violations").and_then(|v| v.as_array()))
        .flatten()
        .filter_map(|v| v.get("quotaId").and_then(|q| q.as_str()))
        .collect();

    !quota_ids.is_empty()
        && quota_ids
            .iter()
            .all(|id| id.contains("PerMinute") || id.contains("PerSecond"))
}

fn parse_response(response: &GeminiResponse) -> Result<serde_json::Value, ProviderError> {
    let text = response.first_text().ok_or_else(|| {
        let reason = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "no candidates".to_string());
        ProviderError::MalformedResponse(format!("empty response ({})", reason))
    })?;

    serde_json::from_str(&text)
        .map_err(|e| ProviderError::MalformedResponse(format!("response is not JSON: {}", e)))
}
