use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PrepError, PrepResult};
use crate::models::CorpusVariant;

/// Recording files in the raw distribution (NIST sphere audio).
pub const RECORDING_EXTENSION: &str = ".wv1";

/// Transcription files in the raw distribution.
pub const TRANSCRIPT_EXTENSION: &str = ".dot";

/// Select the relevant files of a raw corpus distribution.
///
/// A file is kept when it lies below a directory matching the variant's
/// directory patterns (anywhere under `root`) and its name passes the
/// variant's extension and fixed-offset character predicates. The result is
/// sorted so repeated runs on the same tree select in the same order.
pub fn select_files(
    root: &Path,
    variant: &CorpusVariant,
    extension: &str,
) -> PrepResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PrepError::config(format!(
            "input directory does not exist: {}",
            root.display()
        )));
    }

    let mut matched = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !variant.matches_file(name, extension) {
            continue;
        }
        if in_selected_directory(root, entry.path(), variant) {
            matched.push(entry.path().to_path_buf());
        }
    }

    matched.sort();
    Ok(matched)
}

/// Whether any directory component between `root` and the file matches the
/// variant's directory patterns.
fn in_selected_directory(root: &Path, file: &Path, variant: &CorpusVariant) -> bool {
    if variant.directory_patterns.is_none() {
        return true;
    }
    let Ok(relative) = file.strip_prefix(root) else {
        return false;
    };
    relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|dir| variant.matches_directory(dir))
        })
        .unwrap_or(false)
}
