//! Greeting/sign-off presence checks, injection, and wrong-signer detection.

use crate::catalog::{greeting_line, signoff_phrase, ReplyFormat};

/// Keywords that mark a sign-off line in either language.
const SIGNOFF_KEYWORDS: &[&str] = &["regards", "hilsen", "cheers", "thanks", "venlig"];

/// Greeting prefixes accepted on the first non-blank line.
const GREETING_PREFIXES: &[&str] = &["dear ", "hello", "hi ", "hej", "kære"];

fn non_blank_lines_lower(text: &str) -> Vec<String> {
    text.trim()
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Whether the body already starts with a greeting phrase.
pub fn has_initial_greeting(text: &str) -> bool {
    let lines = non_blank_lines_lower(text);
    lines
        .first()
        .is_some_and(|first| GREETING_PREFIXES.iter().any(|p| first.starts_with(p)))
}

/// Whether the body already ends in a sign-off block naming the recipient.
///
/// Requires at least two non-blank lines, the recipient's display name on
/// the last one, and a sign-off keyword on the second-to-last.
pub fn has_signoff(text: &str, recipient_display_name: &str) -> bool {
    let lines = non_blank_lines_lower(text);
    if lines.len() < 2 {
        return false;
    }
    let recipient = recipient_display_name.trim().to_lowercase();
    if recipient.is_empty() {
        return false;
    }
    let [.., second_last, last] = lines.as_slice() else {
        return false;
    };
    last.contains(&recipient) && SIGNOFF_KEYWORDS.iter().any(|k| second_last.contains(k))
}

/// Detect a draft that erroneously signs off with the sender's name.
///
/// Flags when the last non-blank line equals or starts with the sender's
/// first name token, or when the last line contains the full sender name
/// under a sign-off keyword line. Known ambiguity: a recipient sharing the
/// sender's first name token also trips the first check.
pub fn signs_off_as_sender(body: &str, sender_name: &str) -> bool {
    let sender = sender_name.trim().to_lowercase();
    if body.is_empty() || sender.is_empty() {
        return false;
    }
    let lines = non_blank_lines_lower(body);
    let Some(last) = lines.last() else {
        return false;
    };
    if let Some(first_token) = sender.split_whitespace().next() {
        if *last == sender || last.starts_with(first_token) {
            return true;
        }
    }
    if let [.., second_last, last] = lines.as_slice() {
        if last.contains(&sender) && SIGNOFF_KEYWORDS.iter().any(|k| second_last.contains(k)) {
            return true;
        }
    }
    false
}

/// Ensure the body carries a proper greeting at the start and a sign-off
/// block at the end, per the configured format.
///
/// Missing greeting: the catalog greeting line plus at least one blank line
/// is prepended ahead of the left-stripped body. Missing sign-off: at least
/// one blank line, the catalog sign-off phrase, and the recipient name are
/// appended after trimming trailing whitespace.
pub fn inject_greeting_and_signoff(
    body: &str,
    format: &ReplyFormat,
    sender_name: Option<&str>,
    recipient_display_name: &str,
) -> String {
    let mut text = body.to_owned();

    if !has_initial_greeting(&text) {
        let greeting = greeting_line(format, sender_name);
        let blanks = "\n".repeat(usize::from(format.blank_lines_after_greeting.max(1)));
        text = format!("{greeting}\n{blanks}{}", text.trim_start());
    }

    if !has_signoff(&text, recipient_display_name) {
        let signoff = signoff_phrase(format);
        let blanks = "\n".repeat(usize::from(format.blank_lines_before_signoff.max(1)));
        text = format!(
            "{}{blanks}{signoff}\n{recipient_display_name}",
            text.trim_end()
        );
    }

    text
}
