//! HTTP drafting service.
//!
//! A small localhost axum app with two routes: `POST /assist/reply` drafts a
//! reply for a JSON payload, `GET /healthz` reports liveness. Requests are
//! handled concurrently; the composer holds no mutable state, so one shared
//! handle serves all of them.

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::catalog::{GreetingStyle, Language, ReplyFormat, SignOffStyle};
use crate::composer::{ReplyComposer, ReplyRequest, DEFAULT_RECIPIENT_NAME};
use crate::config::Config;

/// Shared per-service state.
#[derive(Clone)]
struct AppState {
    composer: Arc<ReplyComposer>,
    default_format: ReplyFormat,
}

/// JSON payload for `POST /assist/reply`. Only the incoming body is required.
#[derive(Debug, Deserialize)]
struct ReplyPayload {
    #[serde(default)]
    recipient_display_name: Option<String>,
    #[serde(default)]
    incoming_sender_name: Option<String>,
    #[serde(default)]
    incoming_sender_email: Option<String>,
    #[serde(default)]
    incoming_subject: Option<String>,
    incoming_body: String,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    extra: Option<String>,
    #[serde(default)]
    language: Option<Language>,
    #[serde(default)]
    greeting_style: Option<GreetingStyle>,
    #[serde(default)]
    signoff_style: Option<SignOffStyle>,
}

/// JSON response for `POST /assist/reply`.
#[derive(Debug, Serialize)]
struct ReplyResponse {
    subject: String,
    body: String,
}

/// Run the HTTP service until the process is stopped.
///
/// # Errors
///
/// Returns an error when the configured bind address is unusable.
pub async fn serve(config: &Config, composer: Arc<ReplyComposer>) -> anyhow::Result<()> {
    let state = AppState {
        composer,
        default_format: config.format.reply_format(None, None, None),
    };

    let app = Router::new()
        .route("/assist/reply", post(assist_reply))
        .route("/healthz", get(healthz))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(bind = %config.server.bind, "drafting service listening");

    axum::serve(listener, app)
        .await
        .context("http service terminated")?;
    Ok(())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Map a payload onto a [`ReplyRequest`], overlaying per-request style fields
/// on the configured defaults. An omitted or blank recipient display name is
/// replaced with [`DEFAULT_RECIPIENT_NAME`] so the drafted sign-off always
/// carries a signer.
fn reply_request_from(payload: ReplyPayload, mut format: ReplyFormat) -> ReplyRequest {
    if let Some(language) = payload.language {
        format.language = language;
    }
    if let Some(style) = payload.greeting_style {
        format.greeting_style = style;
    }
    if let Some(style) = payload.signoff_style {
        format.signoff_style = style;
    }

    ReplyRequest {
        recipient_display_name: payload
            .recipient_display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_owned()),
        incoming_sender_name: payload.incoming_sender_name,
        incoming_sender_email: payload.incoming_sender_email,
        incoming_subject: payload.incoming_subject,
        incoming_body: payload.incoming_body,
        tone: payload.tone,
        extra: payload.extra,
        format,
    }
}

async fn assist_reply(
    State(state): State<AppState>,
    Json(payload): Json<ReplyPayload>,
) -> Result<Json<ReplyResponse>, (StatusCode, String)> {
    let request = reply_request_from(payload, state.default_format);

    let drafted = state.composer.reply(&request).await.map_err(|e| {
        error!(error = %e, "reply drafting failed");
        (StatusCode::BAD_GATEWAY, format!("drafting failed: {e}"))
    })?;

    Ok(Json(ReplyResponse {
        subject: drafted.subject,
        body: drafted.body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_payload_requires_only_the_body() {
        let payload: ReplyPayload =
            serde_json::from_str(r#"{"incoming_body": "Hello there"}"#).expect("minimal payload");
        assert_eq!(payload.incoming_body, "Hello there");
        assert!(payload.recipient_display_name.is_none());
        assert!(payload.language.is_none());
    }

    #[test]
    fn reply_payload_accepts_style_overrides() {
        let payload: ReplyPayload = serde_json::from_str(
            r#"{
                "incoming_body": "Hej",
                "language": "da",
                "greeting_style": "casual",
                "signoff_style": "kind_regards"
            }"#,
        )
        .expect("styled payload");
        assert_eq!(payload.language, Some(Language::Da));
        assert_eq!(payload.greeting_style, Some(GreetingStyle::Casual));
        assert_eq!(payload.signoff_style, Some(SignOffStyle::KindRegards));
    }

    #[test]
    fn omitted_recipient_name_defaults_to_user() {
        let payload: ReplyPayload =
            serde_json::from_str(r#"{"incoming_body": "Hello there"}"#).expect("minimal payload");
        let request = reply_request_from(payload, ReplyFormat::default());
        assert_eq!(request.recipient_display_name, "User");
    }

    #[test]
    fn blank_recipient_name_defaults_to_user() {
        let payload: ReplyPayload = serde_json::from_str(
            r#"{"incoming_body": "Hello there", "recipient_display_name": "  "}"#,
        )
        .expect("payload with blank recipient");
        let request = reply_request_from(payload, ReplyFormat::default());
        assert_eq!(request.recipient_display_name, "User");
    }

    #[test]
    fn provided_recipient_name_is_kept() {
        let payload: ReplyPayload = serde_json::from_str(
            r#"{"incoming_body": "Hello there", "recipient_display_name": "Filip"}"#,
        )
        .expect("payload with recipient");
        let request = reply_request_from(payload, ReplyFormat::default());
        assert_eq!(request.recipient_display_name, "Filip");
    }
}
