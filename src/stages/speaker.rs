use std::path::Path;

use tracing::debug;

use crate::error::PrepResult;
use crate::io::write_manifest;
use crate::models::{speaker_id, utterance_id_of};
use crate::stages::wavs::list_wav_files;

/// Emit the speaker map: `<utterance-id> <speaker-id>` per kept utterance,
/// the speaker id being a fixed-length prefix of the utterance id.
pub fn emit_speaker_map(
    wavs_dir: &Path,
    speaker_file: &Path,
    prefix_len: usize,
) -> PrepResult<usize> {
    let mut content = String::new();
    let mut count = 0;
    for wav in list_wav_files(wavs_dir)? {
        if let Some(utt_id) = utterance_id_of(&wav) {
            content.push_str(&format!("{} {}\n", utt_id, speaker_id(utt_id, prefix_len)));
            count += 1;
        }
    }
    write_manifest(speaker_file, &content)?;
    debug!("wrote {count} speaker entries");
    Ok(count)
}
