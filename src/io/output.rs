use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::PrepResult;

/// Write a manifest in one shot.
///
/// The content is built in memory by the caller, so a failed emitter never
/// leaves a half-written manifest behind, and re-running an emitter on
/// unchanged input yields a byte-identical file.
pub fn write_manifest(path: &Path, content: &str) -> PrepResult<()> {
    fs::write(path, content.as_bytes())?;
    Ok(())
}

/// Write a machine-readable report under the logs directory.
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> PrepResult<()> {
    let rendered = serde_json::to_string_pretty(report)?;
    fs::write(path, rendered.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_manifest_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.txt");
        write_manifest(&path, "4k0c0301 /wavs/4k0c0301.wav\n").unwrap();
        let first = fs::read(&path).unwrap();
        write_manifest(&path, "4k0c0301 /wavs/4k0c0301.wav\n").unwrap();
        assert_eq!(first, fs::read(&path).unwrap());
    }
}
