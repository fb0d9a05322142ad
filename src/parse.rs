//! Extraction of a structured subject/body pair from generator output.
//!
//! Layered recovery: direct JSON parse first, then a code-fence strip and a
//! balanced-brace scan for the largest syntactically valid JSON object
//! substring, finally a literal `subject:` / `body:` marker split at the
//! caller. Parsing never fails upward — the worst case is `(None, None)`.

use serde_json::{Map, Value};

/// Strip a leading/trailing Markdown code fence (optionally tagged `json`).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim()
}

/// Find the largest-by-character-length valid JSON object substring.
///
/// Scans every `{` start position, tracks brace nesting, and validates each
/// complete candidate with a real JSON parse. The depth counter ignores
/// braces inside strings; the validation step rejects any candidate that
/// misled it.
fn largest_json_object(text: &str) -> Option<Map<String, Value>> {
    let bytes = text.as_bytes();
    let mut best: Option<Map<String, Value>> = None;
    let mut best_len = 0usize;

    for (start, _) in text.char_indices().filter(|(_, c)| *c == '{') {
        let mut depth = 0usize;
        for (offset, byte) in bytes.iter().enumerate().skip(start) {
            match byte {
                b'{' => depth = depth.saturating_add(1),
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let end = offset.saturating_add(1);
                        let candidate = &text[start..end];
                        if candidate.len() > best_len {
                            if let Ok(Value::Object(map)) =
                                serde_json::from_str::<Value>(candidate)
                            {
                                best_len = candidate.len();
                                best = Some(map);
                            }
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    best
}

/// Extract a JSON object from raw generator output.
fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(map);
    }
    largest_json_object(strip_code_fence(text))
}

/// Read a string field accepting both lowercase and capitalized key variants;
/// first non-empty value wins. Blank values collapse to `None`.
fn string_field(map: &Map<String, Value>, key: &str, alt_key: &str) -> Option<String> {
    [key, alt_key]
        .iter()
        .filter_map(|k| map.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parse generator output into an optional subject and body.
///
/// Both `None` means full parse failure; the caller applies the marker-based
/// fallback.
pub fn parse_subject_body(output: &str) -> (Option<String>, Option<String>) {
    let Some(map) = extract_json_object(output) else {
        return (None, None);
    };
    let subject = string_field(&map, "subject", "Subject");
    let body = string_field(&map, "body", "Body");
    (subject, body)
}

/// Last-resort recovery: slice between literal `subject:` and `\nbody:`
/// markers. Returns `None` when the markers are absent or out of order.
pub fn split_on_markers(output: &str) -> Option<(String, String)> {
    let lower = output.to_lowercase();
    let subject_pos = lower.find("subject:")?;
    let body_pos = lower.find("\nbody:")?;
    if subject_pos >= body_pos {
        return None;
    }
    let subject_start = subject_pos.checked_add("subject:".len())?;
    let body_start = body_pos.checked_add("\nbody:".len())?;
    let subject = output.get(subject_start..body_pos)?.trim().to_owned();
    let body = output.get(body_start..)?.trim().to_owned();
    Some((subject, body))
}
