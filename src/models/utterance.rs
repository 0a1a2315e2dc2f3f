use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PrepError, PrepResult};

/// Transcript line format: `<text> (<utterance-id>)`.
static TRANSCRIPT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*) \((\S+)\)$").unwrap());

/// One parsed transcript line: raw text plus the utterance it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub utterance_id: String,
    pub text: String,
}

/// Parse a raw transcript line.
///
/// Malformed lines are a fatal parse error: an unparseable line would
/// otherwise silently drop an utterance (or hide a corrupted-recording
/// marker), which must never happen.
pub fn parse_transcript_line(path: &Path, line: &str) -> PrepResult<TranscriptLine> {
    let trimmed = line.trim_end();
    let captures = TRANSCRIPT_LINE.captures(trimmed).ok_or_else(|| {
        PrepError::parse(path, "expected `<text> (<utterance-id>)`", line)
    })?;
    Ok(TranscriptLine {
        utterance_id: captures[2].to_owned(),
        text: captures[1].to_owned(),
    })
}

/// Derive the speaker id as a fixed-length prefix of the utterance id.
pub fn speaker_id(utterance_id: &str, prefix_len: usize) -> &str {
    let end = utterance_id
        .char_indices()
        .nth(prefix_len)
        .map_or(utterance_id.len(), |(i, _)| i);
    &utterance_id[..end]
}

/// Utterance id of a recording or wav file, i.e. its file stem.
pub fn utterance_id_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
