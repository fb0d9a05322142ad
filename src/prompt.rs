//! Prompt assembly for the generation API.
//!
//! Pure template construction — the exact section order and wording is the
//! contract the output parser and the generator rely on. Every reply prompt
//! encodes the anti-parroting rules, the empathy/mirroring guidance, the
//! output schema, and the literal context block.

use crate::catalog::Language;

/// Inputs for building a reply prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    /// Display name the reply is signed with.
    pub recipient_name: &'a str,
    /// Detected or provided sender name, if any.
    pub sender_name: Option<&'a str>,
    /// Subject of the incoming email, if any.
    pub incoming_subject: Option<&'a str>,
    /// Body of the incoming email.
    pub incoming_body: &'a str,
    /// Tone/style instructions; defaults to "concise and professional".
    pub tone: Option<&'a str>,
    /// Free-form extra instructions, if any.
    pub extra: Option<&'a str>,
    /// Mirroring instruction from fact extraction, if any facts were found.
    pub mirroring: Option<&'a str>,
    /// Target reply language.
    pub language: Language,
}

/// Language-appropriate empathy example sentence, shown to the generator as
/// guidance only.
fn empathy_example(language: Language) -> &'static str {
    match language {
        Language::Da => {
            "Tak for opdateringen vedrørende sag 123456; jeg har noteret den \
             forventede behandlingstid på ca. 14–30 dage."
        }
        Language::En => {
            "I appreciate the update on case 123456; I've noted the expected \
             14–30 day timeline."
        }
    }
}

/// Assemble the user prompt instructing the generator to produce a
/// JSON-formatted reply.
pub fn reply_prompt(ctx: &PromptContext<'_>) -> String {
    let recipient = if ctx.recipient_name.is_empty() {
        "[recipient name]"
    } else {
        ctx.recipient_name
    };
    let sender_ref = ctx.sender_name.filter(|s| !s.is_empty()).unwrap_or("(the sender)");
    let tone = ctx.tone.filter(|t| !t.is_empty()).unwrap_or("concise and professional");
    let lang_name = match ctx.language {
        Language::Da => "DANISH",
        Language::En => "ENGLISH",
    };
    let signoff_example = match ctx.language {
        Language::Da => "Med venlig hilsen,",
        Language::En => "Best regards,",
    };
    let subject = ctx.incoming_subject.filter(|s| !s.is_empty()).unwrap_or("[no subject]");
    let body = if ctx.incoming_body.is_empty() {
        "[no body]"
    } else {
        ctx.incoming_body
    };

    let mut lines: Vec<String> = vec![
        format!("ACT AS: You are writing an email REPLY as the recipient: {recipient}.\n"),
        "CRITICAL RULES:".to_owned(),
        "1) DO NOT restate, translate, or quote the original message. Avoid copying phrases from it.".to_owned(),
        "2) Write ONLY from the recipient's perspective (use 'I' or 'we' / 'jeg' or 'vi').".to_owned(),
        "3) NEVER sign or speak as the sender or the sender's organization.".to_owned(),
        format!("4) Reply in {lang_name}."),
        "5) Output **only** a single JSON object. No extra text.".to_owned(),
        String::new(),
        "EMPATHY & MIRRORING:".to_owned(),
        "- Include ONE short, natural line that reflects the most important detail(s) you noticed (e.g., case number or timeline) in your own words.".to_owned(),
        "- This mirroring line must be 1 sentence, and must NOT quote or translate exact phrases.".to_owned(),
        format!(
            "- Example (do NOT copy; adapt to the context & language): \"{}\"",
            empathy_example(ctx.language)
        ),
        String::new(),
        "REPLY OUTLINE (guidance, adapt as needed):".to_owned(),
        "- Subject: 'Re: [incoming subject]' (or a clear variant).".to_owned(),
        "- Greeting to the sender by name if available.".to_owned(),
        "- Empathic acknowledgement line (1 sentence) using the most important details.".to_owned(),
        "- Next step(s) or what you will do / need from them (confirm info, ask a clarifying question, set expectations).".to_owned(),
        "- Close politely.".to_owned(),
        String::new(),
        "OUTPUT SCHEMA:".to_owned(),
        r#"{"subject":"...", "body":"..."}"#.to_owned(),
        String::new(),
        "CONTEXT (incoming email):".to_owned(),
        format!("Sender (detected/provided): {sender_ref}"),
        format!("Subject: {subject}"),
        "Body:".to_owned(),
        body.to_owned(),
        String::new(),
        "REPLY REQUIREMENTS:".to_owned(),
        format!("- Tone/Style: {tone}."),
        format!("- Sign-off example: {signoff_example} {recipient}"),
    ];

    if let Some(extra) = ctx.extra.filter(|e| !e.is_empty()) {
        lines.push(String::new());
        lines.push("ADDITIONAL NOTES:".to_owned());
        lines.push(extra.to_owned());
    }
    if let Some(mirroring) = ctx.mirroring.filter(|m| !m.is_empty()) {
        lines.push(String::new());
        lines.push("SALIENT FACTS (for the one-sentence mirroring):".to_owned());
        lines.push(mirroring.to_owned());
    }

    lines.push(String::new());
    lines.push("Now produce the reply as a JSON object only.".to_owned());
    lines.join("\n")
}

/// System prompt for the reply path.
pub fn reply_system_prompt(recipient_name: &str) -> String {
    format!(
        "ROLE: You must reply AS the recipient named {recipient_name}. \
         MANDATES: Do not restate/translate the original; do not speak as the sender; \
         first-person only. OUTPUT: JSON only as per the user prompt."
    )
}

/// Corrective re-ask after a parroting detection. Wraps the original prompt
/// so the generator keeps full context.
pub fn parroting_correction(recipient_name: &str, original_prompt: &str) -> String {
    format!(
        "Your previous reply copied/transformed the original message (parroting). \
         Regenerate the JSON reply with these constraints:\n\
         \x20- DO NOT copy or translate phrases from the original email.\n\
         \x20- Include ONE short empathy line that mirrors key facts in your own words.\n\
         \x20- Sign as the recipient: {recipient_name}.\n\
         \x20- Keep it concise and professional.\n\n\
         Reuse the same output schema.\n\n\
         Original task and context below:\n\n{original_prompt}"
    )
}

/// Corrective re-ask after a wrong-signer detection.
pub fn signer_correction(recipient_name: &str, original_prompt: &str) -> String {
    format!(
        "The previous JSON reply mistakenly signed as the SENDER. \
         Please regenerate the reply JSON and sign as the RECIPIENT ({recipient_name}). \
         Write the reply from the recipient's perspective. Do not copy or translate \
         the original. JSON only.\n\n\
         Original prompt and email context:\n\n{original_prompt}"
    )
}

/// System prompt for the generic (non-reply) drafting path.
pub const DRAFT_SYSTEM_PROMPT: &str =
    "ROLE: You write email DRAFTS strictly as the RECIPIENT (first person 'I' or 'we'). \
     MANDATES:\n\
     \x20- NEVER restate, translate, or summarize the original message; compose a response that advances the thread.\n\
     \x20- NEVER write as the sender; NEVER sign or speak as the sender's organization.\n\
     \x20- Keep it concise, professional, and actionable.\n\
     \x20- Prefer ENGLISH unless otherwise explicitly requested.\n\
     OUTPUT: Provide only the text requested by the user/invoking prompt.";

/// User prompt for drafting a brand-new email about a topic.
pub fn new_email_prompt(recipient_address: &str, topic: &str) -> String {
    let recipient = if recipient_address.is_empty() {
        "[recipient]"
    } else {
        recipient_address
    };
    format!(
        "Draft a professional email to {recipient} about:\n\n{topic}\n\n\
         Include a clear subject line suggestion and a polite sign-off."
    )
}
