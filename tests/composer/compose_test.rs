//! End-to-end composer tests over a scripted provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use draftsmith::catalog::{GreetingStyle, Language, ReplyFormat, SignOffStyle};
use draftsmith::composer::{ComposeError, ReplyComposer, ReplyRequest};
use draftsmith::providers::{ChatRequest, LlmProvider, ProviderError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Provider that replays a fixed script of responses and records every
/// request it receives.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn replying(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok((*t).to_owned())).collect())
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("test lock").clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.requests.lock().expect("test lock").push(request);
        self.responses
            .lock()
            .expect("test lock")
            .pop_front()
            .unwrap_or(Err(ProviderError::Empty))
    }

    fn model_id(&self) -> &str {
        "test/mock"
    }
}

fn reply_request(incoming_body: &str) -> ReplyRequest {
    ReplyRequest {
        recipient_display_name: "Filip".to_owned(),
        incoming_subject: Some("Delivery date".to_owned()),
        incoming_body: incoming_body.to_owned(),
        format: ReplyFormat::default(),
        ..ReplyRequest::default()
    }
}

fn json_reply(subject: &str, body: &str) -> String {
    serde_json::json!({ "subject": subject, "body": body }).to_string()
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clean_reply_gets_greeting_and_signoff() {
    let incoming =
        "Could you confirm the delivery date for my order?\n\nBest regards,\nAnna";
    let provider = ScriptedProvider::replying(&[&json_reply(
        "Re: Delivery date",
        "Happy to confirm, your order ships on Friday.",
    )]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(incoming))
        .await
        .expect("reply succeeds");

    assert_eq!(drafted.subject, "Re: Delivery date");
    assert_eq!(
        drafted.body,
        "Dear Anna,\n\nHappy to confirm, your order ships on Friday.\n\nBest regards,\nFilip"
    );
    assert_eq!(provider.requests().len(), 1, "no corrective re-ask expected");
}

#[tokio::test]
async fn prompt_carries_incoming_body_and_salient_facts() {
    let incoming = "Tak for din henvendelse. Din reklamationssag 778899 er modtaget, \
                    og du kan forvente svar inden for 14 dage. Vi sender en opdatering via e-mail.";
    let provider =
        ScriptedProvider::replying(&[&json_reply("Re: Sag 778899", "Tak, jeg afventer svar.")]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let mut request = reply_request(incoming);
    request.format = ReplyFormat {
        language: Language::Da,
        ..ReplyFormat::default()
    };
    composer.reply(&request).await.expect("reply succeeds");

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    let user_prompt = &sent[0].user;
    assert!(user_prompt.contains(incoming), "context block is verbatim");
    assert!(user_prompt.contains("case number: 778899"));
    assert!(user_prompt.contains("estimated timeline: ~14 days"));
    assert!(user_prompt.contains("updates via email"));
    assert!(user_prompt.contains("Reply in DANISH."));
}

#[tokio::test]
async fn missing_sender_name_falls_back_to_neutral_greeting() {
    let incoming = "Quick question about the invoice, can you resend it?";
    let provider =
        ScriptedProvider::replying(&[&json_reply("Re: Invoice", "Of course, resending it now.")]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(incoming))
        .await
        .expect("reply succeeds");

    assert!(drafted.body.starts_with("Hello,\n\n"), "got: {}", drafted.body);
}

#[tokio::test]
async fn provided_sender_name_wins_over_signature() {
    let incoming = "See the details below.\n\nKind regards,\nSupport Team";
    let provider =
        ScriptedProvider::replying(&[&json_reply("Re: Details", "Thanks, I have what I need.")]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let mut request = reply_request(incoming);
    request.incoming_sender_name = Some("Maria".to_owned());
    let drafted = composer.reply(&request).await.expect("reply succeeds");

    assert!(drafted.body.starts_with("Dear Maria,"), "got: {}", drafted.body);
}

// ---------------------------------------------------------------------------
// Corrective re-asks
// ---------------------------------------------------------------------------

const LONG_INCOMING: &str = "We received your complaint about the damaged package and we \
    are very sorry for the inconvenience this has caused you during the busy season. Our \
    support team will investigate the matter and come back to you with a resolution as \
    soon as the carrier confirms what happened to the shipment.";

#[tokio::test]
async fn parroted_draft_is_regenerated_once() {
    let provider = ScriptedProvider::replying(&[
        &json_reply("Re: Complaint", LONG_INCOMING),
        &json_reply("Re: Complaint", "Thank you for looking into this, I await your update."),
    ]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(LONG_INCOMING))
        .await
        .expect("reply succeeds");

    let sent = provider.requests();
    assert_eq!(sent.len(), 2, "exactly one corrective re-ask");
    assert!(sent[1].user.contains("parroting"));
    assert!(
        drafted.body.contains("I await your update"),
        "retry body accepted, got: {}",
        drafted.body
    );
    assert!(!drafted.body.contains("carrier confirms"));
}

#[tokio::test]
async fn failed_parroting_retry_keeps_the_first_draft() {
    let provider = ScriptedProvider::new(vec![
        Ok(json_reply("Re: Complaint", LONG_INCOMING)),
        Err(ProviderError::HttpStatus {
            status: 500,
            body: "upstream error".to_owned(),
        }),
    ]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(LONG_INCOMING))
        .await
        .expect("corrective failure is swallowed");

    assert_eq!(provider.requests().len(), 2);
    assert!(drafted.body.contains("carrier confirms"), "first draft kept");
}

#[tokio::test]
async fn empty_retry_body_keeps_the_first_draft() {
    let provider = ScriptedProvider::replying(&[
        &json_reply("Re: Complaint", LONG_INCOMING),
        &json_reply("Re: Complaint", ""),
    ]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(LONG_INCOMING))
        .await
        .expect("reply succeeds");

    assert!(drafted.body.contains("carrier confirms"), "first draft kept");
}

#[tokio::test]
async fn draft_signed_as_sender_is_regenerated_once() {
    let incoming = "Can you send over the report?\n\nBest regards,\nAnna";
    let provider = ScriptedProvider::replying(&[
        &json_reply(
            "Re: Report",
            "I will send the report shortly.\n\nBest regards,\nAnna",
        ),
        &json_reply("Re: Report", "I will send the report shortly."),
    ]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request(incoming))
        .await
        .expect("reply succeeds");

    let sent = provider.requests();
    assert_eq!(sent.len(), 2, "exactly one corrective re-ask");
    assert!(sent[1].user.contains("signed as the SENDER"));
    assert!(
        drafted.body.ends_with("Best regards,\nFilip"),
        "signed as the recipient, got: {}",
        drafted.body
    );
}

// ---------------------------------------------------------------------------
// Parse fallbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn marker_output_is_recovered_without_json() {
    let provider =
        ScriptedProvider::replying(&["Subject: About your order\nBody: It ships on Friday."]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request("When does my order ship?"))
        .await
        .expect("reply succeeds");

    assert_eq!(drafted.subject, "About your order");
    assert!(drafted.body.contains("It ships on Friday."));
}

#[tokio::test]
async fn free_text_output_falls_back_to_re_subject() {
    let provider = ScriptedProvider::replying(&["Sure, it ships on Friday."]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request("When does my order ship?"))
        .await
        .expect("reply succeeds");

    assert_eq!(drafted.subject, "Re: Delivery date");
    assert!(drafted.body.contains("Sure, it ships on Friday."));
}

#[tokio::test]
async fn fenced_json_output_is_parsed() {
    let provider = ScriptedProvider::replying(&[
        "```json\n{\"subject\": \"Re: Hours\", \"body\": \"We are open until five.\"}\n```",
    ]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let drafted = composer
        .reply(&reply_request("What are your opening hours?"))
        .await
        .expect("reply succeeds");

    assert_eq!(drafted.subject, "Re: Hours");
    assert!(drafted.body.contains("We are open until five."));
}

// ---------------------------------------------------------------------------
// Formatting overrides and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn danish_casual_format_is_applied() {
    let incoming = "Kan du bekræfte mødet?\n\nMed venlig hilsen,\nSøren";
    let provider = ScriptedProvider::replying(&[&json_reply("Re: Møde", "Ja, det passer fint.")]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let mut request = reply_request(incoming);
    request.format = ReplyFormat {
        language: Language::Da,
        greeting_style: GreetingStyle::Casual,
        signoff_style: SignOffStyle::KindRegards,
        ..ReplyFormat::default()
    };
    let drafted = composer.reply(&request).await.expect("reply succeeds");

    assert!(drafted.body.starts_with("Hej Søren,"), "got: {}", drafted.body);
    assert!(
        drafted.body.ends_with("Venlig hilsen,\nFilip"),
        "got: {}",
        drafted.body
    );
}

#[tokio::test]
async fn initial_provider_failure_is_surfaced() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Empty)]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let err = composer
        .reply(&reply_request("Hello?"))
        .await
        .expect_err("initial call failure must surface");
    assert!(matches!(err, ComposeError::Provider(_)));
}

// ---------------------------------------------------------------------------
// New-email drafting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_new_passes_topic_through() {
    let provider = ScriptedProvider::replying(&["Subject suggestion: Kickoff\n\nHi team, ..."]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let body = composer
        .draft_new("team@example.com", "schedule the project kickoff for next week")
        .await
        .expect("draft succeeds");

    assert!(body.contains("Kickoff"));
    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].user.contains("team@example.com"));
    assert!(sent[0].user.contains("project kickoff"));
}

#[tokio::test]
async fn draft_new_rejects_blank_topic() {
    let provider = ScriptedProvider::replying(&[]);
    let composer = ReplyComposer::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    let err = composer
        .draft_new("team@example.com", "   ")
        .await
        .expect_err("blank topic must fail");
    assert!(matches!(err, ComposeError::EmptyTopic));
    assert!(provider.requests().is_empty(), "no generation call made");
}
