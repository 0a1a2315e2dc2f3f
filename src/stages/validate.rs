use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{PrepError, PrepResult};

/// One cross-manifest consistency violation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// An utterance id present in some manifest is absent from another.
    UtteranceMissing {
        utterance_id: String,
        missing_from: String,
    },
    /// An excluded utterance id leaked into a manifest.
    ExcludedUtterancePresent {
        utterance_id: String,
        manifest: String,
    },
    /// A transcription word has no lexicon entry.
    WordMissingFromLexicon { utterance_id: String, word: String },
}

/// Structured result of the validation pass. Violations are reported, never
/// auto-corrected.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check the mutual consistency of the written manifests.
///
/// The utterance-id sets of segments, utt2spk and text must be identical,
/// excluded ids must appear in none of them, and every transcription word
/// must have a lexicon entry.
pub fn validate_corpus(data_dir: &Path, excluded: &HashSet<String>) -> PrepResult<ValidationReport> {
    let segments = read_id_set(&data_dir.join("segments.txt"))?;
    let speakers = read_id_set(&data_dir.join("utt2spk.txt"))?;
    let transcription = read_id_set(&data_dir.join("text.txt"))?;
    let lexicon_words = read_id_set(&data_dir.join("lexicon.txt"))?;

    let mut violations = Vec::new();

    let manifests = [
        ("segments.txt", &segments),
        ("utt2spk.txt", &speakers),
        ("text.txt", &transcription),
    ];

    // every id in any manifest must be in all others
    let mut all_ids: BTreeSet<&String> = BTreeSet::new();
    for (_, ids) in &manifests {
        all_ids.extend(ids.iter());
    }
    for id in &all_ids {
        for (name, ids) in &manifests {
            if !ids.contains(*id) {
                violations.push(Violation::UtteranceMissing {
                    utterance_id: (*id).clone(),
                    missing_from: (*name).to_owned(),
                });
            }
        }
    }

    // excluded ids must be absent everywhere
    for (name, ids) in &manifests {
        for id in excluded {
            if ids.contains(id) {
                violations.push(Violation::ExcludedUtterancePresent {
                    utterance_id: id.clone(),
                    manifest: (*name).to_owned(),
                });
            }
        }
    }

    // every transcription word must be pronounceable
    let text = fs::read_to_string(data_dir.join("text.txt"))?;
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(utt_id) = fields.next() else {
            continue;
        };
        for word in fields {
            if !lexicon_words.contains(word) {
                violations.push(Violation::WordMissingFromLexicon {
                    utterance_id: utt_id.to_owned(),
                    word: word.to_owned(),
                });
            }
        }
    }

    if violations.is_empty() {
        info!("validation passed");
    } else {
        warn!("validation found {} violation(s)", violations.len());
    }
    Ok(ValidationReport { violations })
}

/// First whitespace-separated field of each line of a manifest.
fn read_id_set(path: &Path) -> PrepResult<HashSet<String>> {
    if !path.is_file() {
        return Err(PrepError::MissingArtifact(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_owned)
        .collect())
}
