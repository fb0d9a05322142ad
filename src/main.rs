//! Draftsmith CLI entry point.
//!
//! Provides `reply`, `draft`, and `serve` subcommands for drafting a reply to
//! an incoming email, composing a new email from a topic description, or
//! running the HTTP drafting service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use draftsmith::catalog::{GreetingStyle, Language, SignOffStyle};
use draftsmith::composer::{ReplyComposer, ReplyRequest, DEFAULT_RECIPIENT_NAME};
use draftsmith::config::{config_dir, load_default_config};
use draftsmith::credentials::resolve_api_credentials;
use draftsmith::providers::openai::OpenAiProvider;
use draftsmith::{logging, mailclient, server};

/// Draftsmith — email drafting assistant over a chat-completions API.
#[derive(Parser)]
#[command(name = "draftsmith", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Draft a reply to an incoming email (interactive prompts).
    Reply {
        /// Greeting style for the reply.
        #[arg(long, value_enum)]
        greeting: Option<GreetingStyle>,
        /// Sign-off style for the reply.
        #[arg(long, value_enum)]
        signoff: Option<SignOffStyle>,
        /// Language for greeting and sign-off phrases.
        #[arg(long, value_enum)]
        lang: Option<Language>,
    },
    /// Compose a new email from a topic description (interactive prompts).
    Draft,
    /// Run the HTTP drafting service.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Reply {
            greeting,
            signoff,
            lang,
        } => handle_reply(greeting, signoff, lang).await,
        Command::Draft => handle_draft().await,
        Command::Serve => handle_serve().await,
    }
}

/// Interactive reply flow: gather the incoming email, draft, print, and
/// offer the desktop mail client hand-off.
async fn handle_reply(
    greeting: Option<GreetingStyle>,
    signoff: Option<SignOffStyle>,
    lang: Option<Language>,
) -> anyhow::Result<()> {
    logging::init_cli();

    let config = load_default_config().context("failed to load configuration")?;
    let composer = build_composer(&config)?;
    let format = config.format.reply_format(lang, greeting, signoff);

    println!("\n=== Draftsmith (email reply) ===\n");

    let recipient_name = non_blank(prompt_line(
        "Your display name (for signing replies): ",
    )?)
    .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_owned());
    let sender_name = prompt_line("Sender's name (if known, otherwise leave blank): ")?;
    let sender_email = prompt_line("Sender's email address (to reply to): ")?;
    let subject = prompt_line("Email subject (leave blank if not provided): ")?;
    let incoming_body = prompt_multiline("Paste/type the incoming email content.")?;
    let tone = prompt_line("Tone/style instructions (optional): ")?;
    let extra = prompt_multiline("Any extra notes for the reply?")?;

    let request = ReplyRequest {
        recipient_display_name: recipient_name,
        incoming_sender_name: non_blank(sender_name),
        incoming_sender_email: non_blank(sender_email.clone()),
        incoming_subject: non_blank(subject),
        incoming_body: incoming_body.clone(),
        tone: non_blank(tone),
        extra: non_blank(extra),
        format,
    };

    let drafted = composer
        .reply(&request)
        .await
        .context("failed to generate reply")?;

    let to = if sender_email.is_empty() {
        "(no sender email provided)".to_owned()
    } else {
        sender_email.clone()
    };
    println!("\n--- Generated Reply ---");
    println!("To: {to}");
    println!("Subject: {}", drafted.subject);
    println!("{}", drafted.body);

    let include_original =
        prompt_line("\nInclude the original email below the reply? (Y/n): ")?.to_lowercase();
    let mut mail_body = drafted.body.clone();
    if matches!(include_original.as_str(), "" | "y" | "yes") {
        mail_body.push_str("\n\n--- Original message ---\n");
        mail_body.push_str(&incoming_body);
    }

    open_in_mail_client(&sender_email, &drafted.subject, &mail_body).await;
    Ok(())
}

/// Interactive new-email flow: describe a topic, draft, print, and offer the
/// desktop mail client hand-off.
async fn handle_draft() -> anyhow::Result<()> {
    logging::init_cli();

    let config = load_default_config().context("failed to load configuration")?;
    let composer = build_composer(&config)?;

    println!("\n=== Draftsmith (new email) ===\n");

    let to = prompt_line("Recipient email address (or leave blank to decide later): ")?;
    let subject = prompt_line("Email subject (or leave blank to decide later): ")?;
    let topic = prompt_multiline("What is the email about? Describe the content.")?;

    if topic.trim().is_empty() {
        println!("No email content provided. Exiting.");
        return Ok(());
    }

    let body = composer
        .draft_new(&to, &topic)
        .await
        .context("failed to generate email")?;

    println!("\n--- Drafted Email ---");
    println!("{body}");

    open_in_mail_client(&to, &subject, &body).await;
    Ok(())
}

/// Run the HTTP drafting service with production logging.
async fn handle_serve() -> anyhow::Result<()> {
    let logs_dir = config_dir()?.join("logs");
    let _logging_guard = logging::init_service(&logs_dir)?;

    let config = load_default_config().context("failed to load configuration")?;
    let composer = build_composer(&config)?;
    server::serve(&config, Arc::new(composer)).await
}

/// Resolve credentials and wire up the composer over the configured model.
fn build_composer(config: &draftsmith::config::Config) -> anyhow::Result<ReplyComposer> {
    let credentials = resolve_api_credentials()?;
    let provider = OpenAiProvider::new(config.model.name.clone(), credentials);
    Ok(ReplyComposer::new(Arc::new(provider)))
}

/// Try the desktop mail client; on failure keep going, the draft is already
/// printed.
async fn open_in_mail_client(to: &str, subject: &str, body: &str) {
    println!("\n--- Opening this draft in your mail client (if available) ---");
    if let Err(e) = mailclient::open_draft(to, subject, body).await {
        warn!(error = %e, "mail client hand-off failed");
        println!("Mail client integration failed: {e}");
        println!("Please copy the draft manually into your email client.");
    }
}

/// Read a single trimmed line from stdin.
fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim().to_owned())
}

/// Read multi-line input terminated by a lone "." line (or EOF).
fn prompt_multiline(hint: &str) -> anyhow::Result<String> {
    println!("\n{hint}");
    println!("Finish input by entering a single line with a dot (.)");
    let mut lines = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        if line.trim() == "." {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Empty-after-trim strings become `None`.
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
