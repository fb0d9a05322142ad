//! OpenAI provider implementation using the `/v1/chat/completions` API.

use serde::{Deserialize, Serialize};

use crate::credentials::ApiCredentials;

use super::{check_http_response, ChatRequest, LlmProvider, ProviderError};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/chat/completions";

/// Sampling temperature for drafting. Zero keeps output deterministic and
/// schema-shaped.
const TEMPERATURE: f32 = 0.0;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A message in OpenAI chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`system` or `user`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// OpenAI chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    pub choices: Vec<OpenAiChoice>,
}

/// A response choice from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
}

/// Assistant message from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenAI chat completions API provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    model: String,
    credentials: ApiCredentials,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider for the given model.
    pub fn new(model: String, credentials: ApiCredentials) -> Self {
        Self {
            model,
            credentials,
            client: reqwest::Client::new(),
        }
    }
}

/// Build an OpenAI API request from a chat request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &ChatRequest) -> OpenAiRequest {
    OpenAiRequest {
        model: model.to_owned(),
        messages: vec![
            OpenAiMessage {
                role: "system".to_owned(),
                content: request.system.clone(),
            },
            OpenAiMessage {
                role: "user".to_owned(),
                content: request.user.clone(),
            },
        ],
        temperature: TEMPERATURE,
    }
}

/// Parse an OpenAI API response body into the assistant's text content.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized or has
/// no choices, and `ProviderError::Empty` if the content field is null or
/// blank.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(ProviderError::Empty),
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let api_request = build_request(&self.model, &request);

        let response = self
            .client
            .post(OPENAI_API_BASE)
            .header("content-type", "application/json")
            .header(
                "authorization",
                format!("Bearer {}", self.credentials.api_key()),
            )
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
