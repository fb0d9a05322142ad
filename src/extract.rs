//! Salient-fact and signature extraction from incoming email text.
//!
//! Deterministic regex/string heuristics, no LLM involvement. The extracted
//! facts feed a single short mirroring instruction so the generator can
//! acknowledge key details without quoting the original.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum day windows carried into the mirroring instruction.
const MAX_DAY_WINDOWS: usize = 3;

/// Lines inspected from the bottom of a body for a signature.
const SIGNATURE_TAIL_LINES: usize = 12;

fn case_id_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:sag|case|reklamationssag)[^\d]{0,10}(\d{5,})")
            .expect("valid case id pattern")
    })
}

fn bare_case_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{6,}\b").expect("valid bare id pattern"))
}

fn day_window_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,3})\s*(?:dage|days?)\b").expect("valid day pattern"))
}

fn update_notice_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)opdatering|update|via e-?mail|e-mail").expect("valid update pattern")
    })
}

/// Extract case identifiers: digit runs of length ≥5 following a case marker
/// ("case"/"sag"/"reklamationssag"), plus any bare digit run of length ≥6.
/// Deduplicated in first-occurrence order, marker matches first.
pub fn case_ids(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for capture in case_id_marker_re().captures_iter(text) {
        if let Some(id) = capture.get(1) {
            let id = id.as_str().to_owned();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    for found in bare_case_id_re().find_iter(text) {
        let id = found.as_str().to_owned();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Extract day-count windows: integers 1–365 followed by "days"/"dage",
/// rendered as `"N days"`, deduplicated, capped at the first three.
pub fn day_windows(text: &str) -> Vec<String> {
    let mut windows: Vec<String> = Vec::new();
    for capture in day_window_re().captures_iter(text) {
        let Some(digits) = capture.get(1) else {
            continue;
        };
        let Ok(n) = digits.as_str().parse::<u32>() else {
            continue;
        };
        if !(1..=365).contains(&n) {
            continue;
        }
        let rendered = format!("{n} days");
        if !windows.contains(&rendered) {
            windows.push(rendered);
        }
        if windows.len() >= MAX_DAY_WINDOWS {
            break;
        }
    }
    windows
}

/// Whether the text mentions update/email-notification language.
pub fn mentions_update_notice(text: &str) -> bool {
    update_notice_re().is_match(text)
}

/// Build the mirroring instruction for an incoming body.
///
/// Combines the first case id, the first one or two day windows, and the
/// update-notice flag into a single directive. Returns `None` when no facts
/// were found, so downstream never invents a mirroring instruction.
pub fn mirroring_instruction(incoming_body: &str) -> Option<String> {
    let mut facts: Vec<String> = Vec::new();

    if let Some(id) = case_ids(incoming_body).first() {
        facts.push(format!("case number: {id}"));
    }

    let days = day_windows(incoming_body);
    match days.as_slice() {
        [] => {}
        [only] => facts.push(format!("estimated timeline: ~{only}")),
        [first, second, ..] => {
            facts.push(format!("estimated timeline: ~{first} to {second}"));
        }
    }

    if mentions_update_notice(incoming_body) {
        facts.push("you'll send updates via email".to_owned());
    }

    if facts.is_empty() {
        return None;
    }
    Some(format!(
        "Mirror (in your own words, no quotes) these facts in a single short sentence: {}.",
        facts.join("; ")
    ))
}

// ---------------------------------------------------------------------------
// Signature name extraction
// ---------------------------------------------------------------------------

/// Sign-off marker patterns searched in priority order. Each captures the
/// text following the marker as `name`.
const SIGNOFF_MARKER_PATTERNS: &[&str] = &[
    r"(?is)Med venlig hilsen[,:\-]?\s*\n?(?P<name>.+)",
    r"(?is)Mvh[,:\-]?\s*\n?(?P<name>.+)",
    r"(?is)Venlig hilsen[,:\-]?\s*\n?(?P<name>.+)",
    r"(?is)Best regards[,:\-]?\s*\n?(?P<name>.+)",
    r"(?is)Regards[,:\-]?\s*\n?(?P<name>.+)",
    r"(?is)Kind regards[,:\-]?\s*\n?(?P<name>.+)",
];

fn signoff_marker_regexes() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        SIGNOFF_MARKER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("valid sign-off marker pattern"))
            .collect()
    })
}

/// Characters allowed in an extracted name.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || "ÆØÅæøåÉéÓóÚúÄäÖöÜüß".contains(c)
        || matches!(c, ' ' | '-' | '.' | '\'' | '"')
}

fn angle_fragment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid angle fragment pattern"))
}

/// Strip HTML-angle-bracket fragments and disallowed characters from a
/// candidate name line.
fn scrub_name(line: &str) -> String {
    let without_angles = angle_fragment_re().replace_all(line, "");
    without_angles
        .chars()
        .filter(|c| is_name_char(*c))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Whether a line contains a run of two or more consecutive digits.
fn has_digit_run(line: &str) -> bool {
    let chars: Vec<char> = line.chars().collect();
    chars
        .windows(2)
        .any(|pair| pair[0].is_ascii_digit() && pair[1].is_ascii_digit())
}

/// Attempt to extract the sender's name from the signature block at the tail
/// of an email body.
///
/// Inspects the last twelve non-blank lines. Sign-off markers are matched
/// case-insensitively in a fixed priority order; on the first hit, the text
/// after the marker up to its first line break is scrubbed and returned. When
/// no marker matches, the single last non-blank line is accepted as a name
/// only if it has at most four words, no "@", and no digit run of length two
/// or more.
pub fn sender_name_from_signature(body: &str) -> Option<String> {
    let lines: Vec<&str> = body
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }
    let tail_start = lines.len().saturating_sub(SIGNATURE_TAIL_LINES);
    let tail = &lines[tail_start..];
    let block = tail.join("\n");

    for marker in signoff_marker_regexes() {
        let Some(capture) = marker.captures(&block) else {
            continue;
        };
        let Some(name) = capture.name("name") else {
            continue;
        };
        // The capture runs to the end of the block; the name is its first line.
        let name_line = name.as_str().trim().lines().next().unwrap_or("");
        let scrubbed = scrub_name(name_line);
        if !scrubbed.is_empty() {
            return Some(scrubbed);
        }
    }

    let last = tail.last()?;
    if last.split_whitespace().count() <= 4 && !last.contains('@') && !has_digit_run(last) {
        let scrubbed = scrub_name(last);
        if !scrubbed.is_empty() {
            return Some(scrubbed);
        }
    }
    None
}
