use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{PrepError, PrepResult};
use crate::io::write_manifest;
use crate::stages::normalize::NOISE_WORD;

/// Comment prefix of the CMU pronunciation dictionary.
const COMMENT_PREFIX: &str = ";;;";

/// `WORD(2)` style alternative-pronunciation suffix.
static ALTERNATIVE_PRONUNCIATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([0-9]+\)$").unwrap());

/// Lexical stress digits attached to phone symbols (`EY1` etc).
static STRESS_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Emit the lexicon manifest from the CMU dictionary.
///
/// Comment lines are skipped; a word carrying a parenthesized alternative
/// index is dropped, keeping only the unmarked primary pronunciation;
/// stress digits are stripped from the phones. The synthetic entry for the
/// noise word is appended last.
pub fn emit_lexicon(cmu_dict: &Path, lexicon_file: &Path) -> PrepResult<usize> {
    let raw = fs::read_to_string(cmu_dict)?;

    let mut content = String::new();
    let mut count = 0;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let (word, phones) = line.split_once("  ").ok_or_else(|| {
            PrepError::parse(cmu_dict, "expected `<word>  <phones>`", line)
        })?;

        if ALTERNATIVE_PRONUNCIATION.is_match(word) {
            continue;
        }

        let phones = STRESS_DIGITS.replace_all(phones, "");
        content.push_str(&format!("{word} {phones}\n"));
        count += 1;
    }

    // the generic noise word maps to the noise silence phone
    content.push_str(&format!("{NOISE_WORD} NSN\n"));
    count += 1;

    write_manifest(lexicon_file, &content)?;
    debug!("wrote {count} lexicon entries");
    Ok(count)
}
