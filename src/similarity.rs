//! Parroting detection via token n-gram overlap.
//!
//! A generated reply that substantially copies or mechanically translates the
//! original message is "parroting". Detection uses two signals: the 3-gram
//! overlap ratio between the two texts, and a hard check for a long run of
//! identical consecutive tokens. The ratio alone false-positives on short
//! texts; the run check catches verbatim copying regardless of ratio.

use std::collections::HashSet;

/// N-gram size used for overlap comparison.
const NGRAM_SIZE: usize = 3;

/// Overlap ratio above which a reply is suspect.
const RATIO_THRESHOLD: f64 = 0.35;

/// Minimum number of overlapping n-grams before the ratio applies.
const MIN_OVERLAP_COUNT: usize = 10;

/// Length of a verbatim token run that always flags parroting.
const VERBATIM_RUN_LEN: usize = 10;

/// Split text into lowercase word tokens (Unicode letter/digit runs).
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Build the set of contiguous n-grams over a token slice.
fn ngram_set(tokens: &[String], n: usize) -> HashSet<String> {
    if n == 0 {
        return HashSet::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// Lossless conversion of a set size into `f64` for ratio arithmetic.
fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

/// N-gram overlap ratio between source and candidate output.
///
/// Returns `|intersection| / min(|A|, |B|)` in `0.0..=1.0`, or `0.0` when
/// either n-gram set is empty.
pub fn overlap_ratio(source: &str, output: &str, n: usize) -> f64 {
    let source_grams = ngram_set(&tokens(source), n);
    let output_grams = ngram_set(&tokens(output), n);
    if source_grams.is_empty() || output_grams.is_empty() {
        return 0.0;
    }
    let intersection = source_grams.intersection(&output_grams).count();
    let denom = source_grams.len().min(output_grams.len());
    count_as_f64(intersection) / count_as_f64(denom)
}

/// Whether `output` contains a run of `run_len` consecutive tokens that
/// appears verbatim in the source token stream.
fn has_verbatim_run(source_tokens: &[String], output_tokens: &[String], run_len: usize) -> bool {
    if run_len == 0 || output_tokens.len() < run_len || source_tokens.len() < run_len {
        return false;
    }
    output_tokens
        .windows(run_len)
        .any(|needle| source_tokens.windows(run_len).any(|hay| hay == needle))
}

/// Heuristic parroting check of a generated reply against the original body.
///
/// Flags when the 3-gram overlap ratio exceeds 0.35 with at least 10
/// overlapping 3-grams, or when the output shares a run of 10+ identical
/// consecutive tokens with the source.
pub fn looks_like_parroting(source: &str, output: &str) -> bool {
    let source_tokens = tokens(source);
    let output_tokens = tokens(output);

    let source_grams = ngram_set(&source_tokens, NGRAM_SIZE);
    let output_grams = ngram_set(&output_tokens, NGRAM_SIZE);
    if !source_grams.is_empty() && !output_grams.is_empty() {
        let overlap = source_grams.intersection(&output_grams).count();
        let denom = source_grams.len().min(output_grams.len());
        let ratio = count_as_f64(overlap) / count_as_f64(denom);
        if ratio > RATIO_THRESHOLD && overlap >= MIN_OVERLAP_COUNT {
            return true;
        }
    }

    has_verbatim_run(&source_tokens, &output_tokens, VERBATIM_RUN_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_case_fold_and_split() {
        assert_eq!(
            tokens("Hello, World! Sag 12345."),
            vec!["hello", "world", "sag", "12345"]
        );
    }

    #[test]
    fn tokens_keep_scandinavian_letters() {
        assert_eq!(tokens("Kære Søren"), vec!["kære", "søren"]);
    }

    #[test]
    fn disjoint_texts_have_zero_ratio() {
        let a = "one two three four five six";
        let b = "alpha beta gamma delta epsilon zeta";
        assert_eq!(overlap_ratio(a, b, 3), 0.0);
    }

    #[test]
    fn identical_text_has_ratio_one_and_flags() {
        let text = "we received your claim and will process it within fourteen days \
                    please keep this case number for future reference";
        assert!((overlap_ratio(text, text, 3) - 1.0).abs() < f64::EPSILON);
        assert!(looks_like_parroting(text, text));
    }

    #[test]
    fn empty_output_has_zero_ratio() {
        assert_eq!(overlap_ratio("some source text here", "", 3), 0.0);
        assert!(!looks_like_parroting("some source text here", ""));
    }

    #[test]
    fn short_texts_do_not_trip_the_ratio() {
        // High ratio but fewer than 10 overlapping 3-grams.
        let a = "thanks for the quick update";
        let b = "thanks for the quick update";
        assert!((overlap_ratio(a, b, 3) - 1.0).abs() < f64::EPSILON);
        assert!(!looks_like_parroting(a, b));
    }

    #[test]
    fn verbatim_run_flags_regardless_of_ratio() {
        let source = "our records show that the shipment left the warehouse on \
                      monday morning and should arrive within five business days \
                      according to the carrier";
        // Long unrelated reply that embeds a 10-token copy.
        let output = "I appreciate the information you sent over. For reference, \
                      the shipment left the warehouse on monday morning and should \
                      arrive within five business days. I will follow up separately \
                      about the invoice discrepancy we discussed on the phone last \
                      week and confirm the final amounts with accounting before the \
                      end of the quarter.";
        assert!(looks_like_parroting(source, output));
    }

    #[test]
    fn paraphrase_is_not_flagged() {
        let source = "we received your claim with case number 4582193 and expect \
                      processing to take between fourteen and thirty days you will \
                      receive updates via email as the case progresses";
        let output = "Thank you for the update on case 4582193; I have noted the \
                      expected two-to-four week timeline and will watch my inbox.";
        assert!(!looks_like_parroting(source, output));
    }
}
