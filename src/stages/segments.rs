use std::path::Path;

use tracing::debug;

use crate::error::PrepResult;
use crate::io::write_manifest;
use crate::models::utterance_id_of;
use crate::stages::wavs::list_wav_files;

/// Emit the segments manifest: `<utterance-id> <wav-path>` per kept
/// recording, derived from the wavs directory listing.
pub fn emit_segments(wavs_dir: &Path, segments_file: &Path) -> PrepResult<usize> {
    let mut content = String::new();
    let mut count = 0;
    for wav in list_wav_files(wavs_dir)? {
        if let Some(utt_id) = utterance_id_of(&wav) {
            content.push_str(&format!("{} {}\n", utt_id, wav.display()));
            count += 1;
        }
    }
    write_manifest(segments_file, &content)?;
    debug!("wrote {count} segments");
    Ok(count)
}
