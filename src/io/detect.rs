use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PrepResult;
use crate::models::parse_transcript_line;

/// Marker embedded in a transcript when the associated recording is
/// corrupted or missing from the distribution.
pub const BAD_RECORDING_MARKER: &str = "[bad_recording]";

/// Scan transcript files and collect the utterance ids flagged as
/// corrupted.
///
/// Any utterance id returned here must be excluded from every manifest. A
/// marked line that does not match the `<text> (<utterance-id>)` format is
/// a fatal parse error: skipping it would silently keep a corrupted
/// utterance in the corpus.
pub fn detect_corrupted_utterances(transcripts: &[PathBuf]) -> PrepResult<HashSet<String>> {
    let mut excluded = HashSet::new();
    for path in transcripts {
        scan_transcript(path, &mut excluded)?;
    }
    debug!("found {} corrupted utterances", excluded.len());
    Ok(excluded)
}

fn scan_transcript(path: &Path, excluded: &mut HashSet<String>) -> PrepResult<()> {
    let content = fs::read_to_string(path)?;
    for line in content.lines() {
        if line.contains(BAD_RECORDING_MARKER) {
            let parsed = parse_transcript_line(path, line)?;
            debug!("corrupted utterance {} in {}", parsed.utterance_id, path.display());
            excluded.insert(parsed.utterance_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    #[test]
    fn test_detects_marked_utterances() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(
            &trs,
            "THE FIRST LINE (4k0c0301)\n\
             SOMETHING [bad_recording] HERE (4k0c0302)\n\
             THE THIRD LINE (4k0c0303)\n",
        )
        .unwrap();

        let excluded = detect_corrupted_utterances(&[trs]).unwrap();
        assert_eq!(excluded.len(), 1);
        assert!(excluded.contains("4k0c0302"));
    }

    #[test]
    fn test_clean_transcripts_give_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(&trs, "THE FIRST LINE (4k0c0301)\n").unwrap();

        let excluded = detect_corrupted_utterances(&[trs]).unwrap();
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_marked_but_malformed_line_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(&trs, "GARBAGE [bad_recording] WITHOUT AN ID\n").unwrap();

        let err = detect_corrupted_utterances(&[trs]).unwrap_err();
        assert!(matches!(err, PrepError::Parse { .. }));
    }
}
