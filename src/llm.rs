use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn, error};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing API credential (set OPENAI_API_KEY)")]
    MissingCredential,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("model returned no itinerary text")]
    Empty,
}

impl GenerationError {
    pub fn is_auth(&self) -> bool {
        matches!(self, GenerationError::MissingCredential | GenerationError::Auth(_))
    }

    /// Failures worth another attempt when retries are configured.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::RateLimited(_) | GenerationError::Timeout(_) | GenerationError::Network(_) => true,
            GenerationError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Anything that can turn a request text into itinerary markdown.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, request_text: &str) -> Result<String, GenerationError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    max_retries: u32,
    system_prompt: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
            max_retries: config.max_retries,
            system_prompt: crate::prompt::SYSTEM_PROMPT.to_string(),
        })
    }

    pub fn model(&self) -> &str { &self.model }

    async fn perform_api_call(&self, api_key: &str, request_text: &str) -> Result<String, GenerationError> {
        let url = chat_url(&self.base_url);

        let request_body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": request_text},
            ],
            "max_completion_tokens": self.max_tokens,
        });

        info!("🔗 Requesting itinerary from {} (model={}, prompt={} chars)", url, self.model, request_text.len());

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = api_error_message(&response_text).unwrap_or_else(|| truncate(&response_text, 500));
            error!("❌ API error response: {}", message);
            return Err(classify_status(status, message));
        }

        let parsed: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Malformed(format!("{}: {}", e, truncate(&response_text, 200))))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        // returned verbatim; the renderer classifies lines exactly as the model wrote them
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ItineraryGenerator for OpenAiClient {
    async fn generate(&self, request_text: &str) -> Result<String, GenerationError> {
        let api_key = match self.api_key.as_deref() {
            Some(k) => k,
            None => {
                error!("❌ No API key configured, refusing to call the model");
                return Err(GenerationError::MissingCredential);
            }
        };

        let mut attempt = 0u32;
        loop {
            match self.perform_api_call(api_key, request_text).await {
                Ok(text) => {
                    info!("✅ Itinerary generated ({} chars)", text.len());
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = backoff(attempt);
                    attempt += 1;
                    warn!("🔄 Attempt {} failed ({}), retrying in {:?}", attempt, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("❌ Itinerary generation failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    let base = 250u64.saturating_mul(1 << attempt.min(6));
    let jitter = rand::thread_rng().gen_range(0..=base / 4);
    Duration::from_millis(base + jitter)
}

fn chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

fn classify_status(status: StatusCode, message: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        _ => GenerationError::Status { status: status.as_u16(), body: message },
    }
}

fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.get("message")?.as_str().map(str::to_string)
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice { #[serde(default)] message: Message }

#[derive(Debug, Deserialize, Default)]
struct Message { #[serde(default)] content: Option<String> }
