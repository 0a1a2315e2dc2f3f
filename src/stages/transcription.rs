use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PrepResult;
use crate::io::write_manifest;
use crate::models::parse_transcript_line;
use crate::stages::normalize::normalize_text;

/// Emit the transcription manifest: `<utterance-id> <word...>` per kept
/// utterance, with every raw token normalized and excluded utterances
/// omitted entirely.
pub fn emit_transcription(
    transcripts: &[PathBuf],
    excluded: &HashSet<String>,
    transcription_file: &Path,
) -> PrepResult<usize> {
    let mut content = String::new();
    let mut count = 0;
    for path in transcripts {
        count += append_transcript(path, excluded, &mut content)?;
    }
    write_manifest(transcription_file, &content)?;
    debug!("wrote {count} transcription entries");
    Ok(count)
}

fn append_transcript(
    path: &Path,
    excluded: &HashSet<String>,
    content: &mut String,
) -> PrepResult<usize> {
    let raw = fs::read_to_string(path)?;
    let mut count = 0;
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = parse_transcript_line(path, line)?;
        if excluded.contains(&parsed.utterance_id) {
            continue;
        }
        let text = normalize_text(&parsed.text);
        content.push_str(&format!("{} {}\n", parsed.utterance_id, text));
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    #[test]
    fn test_emit_transcription_normalizes_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(&trs, "THE <DOOR> SLAMMED [loud_breath] (4k0c0301)\n").unwrap();

        let out = dir.path().join("text.txt");
        let count = emit_transcription(&[trs], &HashSet::new(), &out).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "4k0c0301 THE DOOR SLAMMED <noise>\n"
        );
    }

    #[test]
    fn test_excluded_utterances_are_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(
            &trs,
            "KEEP THIS ONE (4k0c0301)\nDROP [bad_recording] THIS (4k0c0302)\n",
        )
        .unwrap();

        let excluded: HashSet<String> = ["4k0c0302".to_owned()].into();
        let out = dir.path().join("text.txt");
        emit_transcription(&[trs], &excluded, &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains("4k0c0301"));
        assert!(!content.contains("4k0c0302"));
    }

    #[test]
    fn test_malformed_line_is_fatal_and_leaves_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let trs = dir.path().join("4k0c03.dot");
        fs::write(&trs, "A GOOD LINE (4k0c0301)\nA BAD LINE\n").unwrap();

        let out = dir.path().join("text.txt");
        let err = emit_transcription(&[trs], &HashSet::new(), &out).unwrap_err();
        assert!(matches!(err, PrepError::Parse { .. }));
        // content is built in memory, so nothing was written
        assert!(!out.exists());
    }
}
