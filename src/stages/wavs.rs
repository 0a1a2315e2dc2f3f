use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PrepResult;
use crate::models::utterance_id_of;
use crate::process::run_command;

/// Populate the wavs directory from the selected recordings.
///
/// Excluded utterances are skipped entirely. The step is idempotent: a
/// recording whose target wav already exists is not converted again, so the
/// step can be re-run after a partial failure. Plain `.wav` sources are
/// hard-linked; sphere-encoded sources go through the external `sph2pipe`
/// tool.
pub fn convert_recordings(
    recordings: &[PathBuf],
    wavs_dir: &Path,
    excluded: &HashSet<String>,
) -> PrepResult<usize> {
    info!("converting {} recordings to wav", recordings.len());

    let mut converted = 0;
    for source in recordings {
        let Some(utt_id) = utterance_id_of(source) else {
            continue;
        };
        if excluded.contains(utt_id) {
            debug!("skipping corrupted utterance {utt_id}");
            continue;
        }

        let target = wavs_dir.join(format!("{utt_id}.wav"));
        if target.exists() {
            continue;
        }

        if source.extension().and_then(|e| e.to_str()) == Some("wav") {
            fs::hard_link(source, &target)?;
        } else {
            sph2wav(source, &target)?;
        }
        converted += 1;
    }

    debug!("converted {converted} recordings");
    Ok(converted)
}

/// Convert one sphere file to wav with sph2pipe (must be on PATH).
fn sph2wav(source: &Path, target: &Path) -> PrepResult<()> {
    let args = vec![
        "-f".to_owned(),
        "wav".to_owned(),
        source.display().to_string(),
        target.display().to_string(),
    ];
    run_command("sph2pipe", &args, None)?;
    Ok(())
}

/// List the wav files of the output directory, sorted.
///
/// The segments and utt2spk emitters both derive their utterance list from
/// this listing, so the two manifests always agree.
pub fn list_wav_files(wavs_dir: &Path) -> PrepResult<Vec<PathBuf>> {
    let mut wavs = Vec::new();
    for entry in fs::read_dir(wavs_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            wavs.push(entry.path());
        }
    }
    wavs.sort();
    Ok(wavs)
}
