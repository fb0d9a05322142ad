//! Reply composition orchestrator.
//!
//! Sequences fact extraction → prompt build → generation call → parse →
//! anti-parroting check → wrong-signer check → greeting/sign-off injection.
//! Each corrective step is a single best-effort re-ask: it returns either an
//! improved draft or the prior one, and a failure during the corrective call
//! never crosses into the success path.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::ReplyFormat;
use crate::extract;
use crate::format;
use crate::parse;
use crate::prompt::{self, PromptContext};
use crate::providers::{ChatRequest, LlmProvider, ProviderError};
use crate::similarity;

/// Signer name used when the caller does not provide one. Boundaries
/// (HTTP payload mapping, CLI prompts) substitute this before building a
/// [`ReplyRequest`], so the sign-off never carries an empty name line.
pub const DEFAULT_RECIPIENT_NAME: &str = "User";

/// A request to draft a reply to an incoming email.
#[derive(Debug, Clone, Default)]
pub struct ReplyRequest {
    /// Display name the reply is signed with.
    pub recipient_display_name: String,
    /// Sender name, when known; otherwise extracted from the signature.
    pub incoming_sender_name: Option<String>,
    /// Sender email address (informational, used by callers for the draft).
    pub incoming_sender_email: Option<String>,
    /// Subject of the incoming email.
    pub incoming_subject: Option<String>,
    /// Body of the incoming email.
    pub incoming_body: String,
    /// Tone/style instructions.
    pub tone: Option<String>,
    /// Free-form extra instructions.
    pub extra: Option<String>,
    /// Formatting rules for the drafted reply.
    pub format: ReplyFormat,
}

/// A drafted reply: subject and fully formatted body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftedReply {
    /// Reply subject line.
    pub subject: String,
    /// Reply body with greeting and sign-off in place.
    pub body: String,
}

/// Errors surfaced by the composer.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The initial generation call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// A new-email draft was requested without a topic.
    #[error("topic description cannot be empty")]
    EmptyTopic,
}

/// Drafts replies and new emails through an injected generation provider.
pub struct ReplyComposer {
    provider: Arc<dyn LlmProvider>,
}

impl ReplyComposer {
    /// Create a composer over a provider handle.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Draft a reply to an incoming email.
    ///
    /// Anti-parroting and wrong-signer detections each trigger at most one
    /// corrective re-ask; persistent generator misbehavior after that is
    /// accepted as the final output. Unparseable output is recovered through
    /// layered fallbacks and never surfaces as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Provider`] only when the initial generation
    /// call fails.
    pub async fn reply(&self, request: &ReplyRequest) -> Result<DraftedReply, ComposeError> {
        let recipient = request.recipient_display_name.as_str();
        let sender_name = request
            .incoming_sender_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| extract::sender_name_from_signature(&request.incoming_body));

        let mirroring = extract::mirroring_instruction(&request.incoming_body);
        let user_prompt = prompt::reply_prompt(&PromptContext {
            recipient_name: recipient,
            sender_name: sender_name.as_deref(),
            incoming_subject: request.incoming_subject.as_deref(),
            incoming_body: &request.incoming_body,
            tone: request.tone.as_deref(),
            extra: request.extra.as_deref(),
            mirroring: mirroring.as_deref(),
            language: request.format.language,
        });
        let system_prompt = prompt::reply_system_prompt(recipient);

        let output = self
            .provider
            .chat(ChatRequest::new(&system_prompt, &user_prompt))
            .await?;

        let (mut subject, mut body) = parse::parse_subject_body(&output);
        if subject.is_none() && body.is_none() {
            // Layered fallback: literal markers, then raw output as body.
            if let Some((marker_subject, marker_body)) = parse::split_on_markers(&output) {
                debug!("generator output recovered via subject/body markers");
                subject = Some(marker_subject);
                body = Some(marker_body);
            } else {
                debug!("generator output unparseable, using raw text as body");
                subject = Some(reply_subject_fallback(request.incoming_subject.as_deref()));
                body = Some(output.trim().to_owned());
            }
        }

        if body
            .as_deref()
            .is_some_and(|b| similarity::looks_like_parroting(&request.incoming_body, b))
        {
            warn!(model = self.provider.model_id(), "draft parrots the original, re-asking once");
            let correction = prompt::parroting_correction(recipient, &user_prompt);
            match self
                .provider
                .chat(ChatRequest::new(&system_prompt, &correction))
                .await
            {
                Ok(retry_output) => {
                    let (retry_subject, retry_body) = parse::parse_subject_body(&retry_output);
                    // Accept the retry only when it produced a body.
                    if let Some(retry_body) = retry_body {
                        if retry_subject.is_some() {
                            subject = retry_subject;
                        }
                        body = Some(retry_body);
                    }
                }
                Err(e) => debug!(error = %e, "parroting correction failed, keeping first draft"),
            }
        }

        if let (Some(sender), Some(current)) = (sender_name.as_deref(), body.as_deref()) {
            if format::signs_off_as_sender(current, sender) {
                warn!("draft signs off as the sender, re-asking once");
                let correction = prompt::signer_correction(recipient, &user_prompt);
                match self
                    .provider
                    .chat(ChatRequest::new(&system_prompt, &correction))
                    .await
                {
                    Ok(retry_output) => {
                        let (retry_subject, retry_body) = parse::parse_subject_body(&retry_output);
                        // Accept subject and body individually.
                        if retry_subject.is_some() {
                            subject = retry_subject;
                        }
                        if retry_body.is_some() {
                            body = retry_body;
                        }
                    }
                    Err(e) => debug!(error = %e, "signer correction failed, keeping draft"),
                }
            }
        }

        let final_body = format::inject_greeting_and_signoff(
            body.as_deref().unwrap_or(""),
            &request.format,
            sender_name.as_deref(),
            recipient,
        );
        let final_subject = subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| reply_subject_fallback(request.incoming_subject.as_deref()));

        Ok(DraftedReply {
            subject: final_subject,
            body: final_body,
        })
    }

    /// Draft a brand-new email body about a topic.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::EmptyTopic`] when the topic is blank, or
    /// [`ComposeError::Provider`] when the generation call fails.
    pub async fn draft_new(
        &self,
        recipient_address: &str,
        topic: &str,
    ) -> Result<String, ComposeError> {
        if topic.trim().is_empty() {
            return Err(ComposeError::EmptyTopic);
        }
        let user_prompt = prompt::new_email_prompt(recipient_address, topic);
        let output = self
            .provider
            .chat(ChatRequest::new(prompt::DRAFT_SYSTEM_PROMPT, user_prompt))
            .await?;
        Ok(output)
    }
}

/// `"Re: "` + the incoming subject, trimmed.
fn reply_subject_fallback(incoming_subject: Option<&str>) -> String {
    format!("Re: {}", incoming_subject.unwrap_or("")).trim().to_owned()
}
