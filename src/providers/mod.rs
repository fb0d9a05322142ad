//! Generation API provider abstraction.
//!
//! Defines the [`LlmProvider`] trait and the request type shared by provider
//! implementations. One provider is implemented:
//! [`openai::OpenAiProvider`] — OpenAI `/v1/chat/completions` API.
//!
//! The provider handle is constructed explicitly at startup and injected
//! into the composer; there is no lazily-initialized global client.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

pub mod openai;

/// A single system + user instruction pair sent to the generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System instruction text.
    pub system: String,
    /// User instruction text.
    pub user: String,
}

impl ChatRequest {
    /// Build a request from system and user instruction text.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Errors returned by generation API providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("generation API call failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Upstream responded with an error status.
    #[error("generation API returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Response did not match the expected schema.
    #[error("generation API response parse error: {0}")]
    Parse(String),
    /// The response carried no assistant content.
    #[error("generation API returned empty content")]
    Empty,
}

/// Core generation API interface.
///
/// Implementations must be `Send + Sync` so a single handle can be shared
/// across the CLI and HTTP surfaces.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat request and return the assistant's free-form text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or parse failure.
    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// The model identifier this provider is instantiated for.
    fn model_id(&self) -> &str;
}

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure,
/// `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Maximum characters of an upstream error body carried into our error.
const MAX_ERROR_BODY_CHARS: usize = 256;

fn api_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"sk-[A-Za-z0-9_\-]{20,}").expect("valid key pattern"))
}

/// Collapse whitespace, redact API-key-shaped strings, and truncate an
/// upstream error body before it reaches logs or callers.
fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let sanitized = api_key_re()
        .replace_all(&collapsed, "[REDACTED]")
        .into_owned();

    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }
    sanitized
}
