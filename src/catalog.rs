//! Static phrase catalogs and reply formatting configuration.
//!
//! Greetings and sign-offs are resolved through a fixed lookup table keyed by
//! `(Language, Style)` with an explicit two-level fallback: exact match, then
//! the language's default style (`Neutral` greeting / `BestRegards` sign-off),
//! then a global literal.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Reply language, selecting catalog entries and prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Danish.
    Da,
}

/// Greeting style for the opening line of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum GreetingStyle {
    /// Formal when a sender name is known, neutral otherwise.
    #[default]
    Auto,
    /// "Dear {name}," style.
    Formal,
    /// "Hello," style, no name.
    Neutral,
    /// "Hi {name}," style.
    Casual,
}

/// Sign-off style for the closing phrase of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SignOffStyle {
    /// "Best regards," / "Med venlig hilsen,".
    #[default]
    BestRegards,
    /// "Kind regards," / "Venlig hilsen,".
    KindRegards,
    /// "Regards," / "Hilsen,".
    Regards,
    /// "Cheers," / "De bedste hilsner,".
    Cheers,
    /// "Thanks," / "Tak,".
    Thanks,
}

/// Formatting rules applied to a single reply. Immutable per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyFormat {
    /// Language for greeting/sign-off phrases.
    pub language: Language,
    /// Greeting style; `Auto` resolves against the known sender name.
    pub greeting_style: GreetingStyle,
    /// Sign-off style.
    pub signoff_style: SignOffStyle,
    /// Blank lines between greeting and body. A minimum of one is enforced
    /// at injection time.
    pub blank_lines_after_greeting: u8,
    /// Blank lines between body and sign-off. A minimum of one is enforced
    /// at injection time.
    pub blank_lines_before_signoff: u8,
}

impl Default for ReplyFormat {
    fn default() -> Self {
        Self {
            language: Language::En,
            greeting_style: GreetingStyle::Auto,
            signoff_style: SignOffStyle::BestRegards,
            blank_lines_after_greeting: 1,
            blank_lines_before_signoff: 2,
        }
    }
}

/// Greeting templates. `{name}` is replaced by the normalized sender name.
const GREETING_CATALOG: &[(Language, GreetingStyle, &str)] = &[
    (Language::En, GreetingStyle::Formal, "Dear {name},"),
    (Language::En, GreetingStyle::Neutral, "Hello,"),
    (Language::En, GreetingStyle::Casual, "Hi {name},"),
    (Language::Da, GreetingStyle::Formal, "Kære {name},"),
    (Language::Da, GreetingStyle::Neutral, "Hej,"),
    (Language::Da, GreetingStyle::Casual, "Hej {name},"),
];

/// Sign-off phrases.
const SIGNOFF_CATALOG: &[(Language, SignOffStyle, &str)] = &[
    (Language::En, SignOffStyle::BestRegards, "Best regards,"),
    (Language::En, SignOffStyle::KindRegards, "Kind regards,"),
    (Language::En, SignOffStyle::Regards, "Regards,"),
    (Language::En, SignOffStyle::Cheers, "Cheers,"),
    (Language::En, SignOffStyle::Thanks, "Thanks,"),
    (Language::Da, SignOffStyle::BestRegards, "Med venlig hilsen,"),
    (Language::Da, SignOffStyle::KindRegards, "Venlig hilsen,"),
    (Language::Da, SignOffStyle::Regards, "Hilsen,"),
    (Language::Da, SignOffStyle::Cheers, "De bedste hilsner,"),
    (Language::Da, SignOffStyle::Thanks, "Tak,"),
];

/// Fallback greeting when no catalog entry matches.
const DEFAULT_GREETING: &str = "Hello,";

/// Fallback sign-off when no catalog entry matches.
const DEFAULT_SIGNOFF: &str = "Best regards,";

/// Collapse runs of whitespace in a name to single spaces.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve the greeting line for a reply.
///
/// `Auto` resolves to `Formal` when a sender name is known, else `Neutral`.
/// The `{name}` slot in the template is filled with the normalized sender
/// name (empty when unknown).
pub fn greeting_line(format: &ReplyFormat, sender_name: Option<&str>) -> String {
    let style = match format.greeting_style {
        GreetingStyle::Auto => {
            if sender_name.is_some_and(|n| !n.trim().is_empty()) {
                GreetingStyle::Formal
            } else {
                GreetingStyle::Neutral
            }
        }
        other => other,
    };

    let template = lookup_greeting(format.language, style)
        .or_else(|| lookup_greeting(format.language, GreetingStyle::Neutral))
        .unwrap_or(DEFAULT_GREETING);

    let safe_name = normalize_name(sender_name.unwrap_or(""));
    template.replace("{name}", &safe_name)
}

fn lookup_greeting(language: Language, style: GreetingStyle) -> Option<&'static str> {
    GREETING_CATALOG
        .iter()
        .find(|(lang, s, _)| *lang == language && *s == style)
        .map(|(_, _, t)| *t)
}

/// Resolve the sign-off phrase for a reply.
pub fn signoff_phrase(format: &ReplyFormat) -> &'static str {
    lookup_signoff(format.language, format.signoff_style)
        .or_else(|| lookup_signoff(format.language, SignOffStyle::BestRegards))
        .unwrap_or(DEFAULT_SIGNOFF)
}

fn lookup_signoff(language: Language, style: SignOffStyle) -> Option<&'static str> {
    SIGNOFF_CATALOG
        .iter()
        .find(|(lang, s, _)| *lang == language && *s == style)
        .map(|(_, _, p)| *p)
}
