//! Transcript token normalization.
//!
//! The raw WSJ transcripts carry formatting artifacts and event annotations
//! that must be mapped to dictionary words or dropped before the text
//! manifest is written.

/// Canonical marker for a generic noise annotation.
pub const NOISE_WORD: &str = "<noise>";

/// Normalize one whitespace-delimited transcript token.
///
/// Returns the canonical uppercase form of the token, or an empty string
/// when the token is an event boundary rather than spoken content. Rules,
/// in order:
///
/// * upcase everything to match the CMU dictionary and remove backslash
///   quoting
/// * `%PERCENT` and `.POINT` are formatting artifacts for their spoken form
/// * `<WORD>` means verbal deletion; the brackets go, the word stays
/// * `~` (utterance truncation) and `.` (pause) are not words
/// * `[<x]`, `[x>]`, `[x/]` and `[/x]` mark where a noise event begins or
///   ends relative to the adjoining word; the word itself is kept by the
///   surrounding tokens, so the marker is dropped
/// * any other `[...]` annotation is a noise that replaced speech and
///   becomes the generic `<noise>` word
/// * `--DASH` appears in some transcripts where the CMU dictionary has
///   `-DASH`
pub fn normalize_token(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut word = raw.to_uppercase().replace('\\', "");
    word = word.replace("%PERCENT", "PERCENT").replace(".POINT", "POINT");
    if word.len() >= 2 && word.starts_with('<') && word.ends_with('>') {
        word = word[1..word.len() - 1].to_owned();
    }

    if word == "~" || word == "." {
        return String::new();
    }
    let is_event_boundary = (word.starts_with("[<") && word.ends_with(']'))
        || (word.starts_with('[') && word.ends_with(">]"))
        || (word.starts_with('[') && word.ends_with("/]"))
        || (word.starts_with("[/") && word.ends_with(']'));
    if is_event_boundary {
        return String::new();
    }

    if word.len() >= 2 && word.starts_with('[') && word.ends_with(']') {
        return NOISE_WORD.to_owned();
    }

    if word == "--DASH" {
        return "-DASH".to_owned();
    }

    word
}

/// Normalize a whole transcript text: every whitespace token is normalized
/// and the dropped ones removed.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(normalize_token)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
