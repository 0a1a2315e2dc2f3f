//! Forced-alignment adapter around the external Kaldi toolkit.
//!
//! The toolkit is an opaque collaborator with a directory-based contract: a
//! recipe directory with hard-linked data files, a language-model directory
//! holding the phone table and an acoustic-model directory holding the
//! trained model. This module only wires files and subprocesses together;
//! the corpus manifests written by the preparation pipeline are never
//! touched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PrepError, PrepResult};
use crate::io::write_manifest;
use crate::process::run_command;

/// Data files hard-linked from the acoustic-model directory into the
/// alignment recipe.
const RECIPE_DATA_FILES: &[&str] = &[
    "text", "utt2spk", "spk2utt", "segments", "wav.scp", "feats.scp", "cmvn.scp",
];

/// Kaldi frame spacing in seconds.
const FRAME_SHIFT: f64 = 0.01;

/// Configuration of one forced-alignment run.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Recipe directory the alignment is computed in
    pub recipe_dir: PathBuf,
    /// Language-model directory, must contain `phones.txt`
    pub lm_dir: PathBuf,
    /// Acoustic-model directory, must contain `final.mdl`
    pub am_dir: PathBuf,
    /// Number of parallel toolkit jobs
    pub njobs: usize,
    /// Command wrapper the toolkit uses to launch jobs
    pub train_cmd: String,
}

impl AlignConfig {
    pub fn new(recipe_dir: PathBuf, lm_dir: PathBuf, am_dir: PathBuf) -> Self {
        Self {
            recipe_dir,
            lm_dir,
            am_dir,
            njobs: 1,
            train_cmd: "run.pl".to_owned(),
        }
    }
}

/// Compute a forced phone alignment of a prepared corpus.
pub struct ForceAlign {
    config: AlignConfig,
}

impl ForceAlign {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    /// Check that the acoustic and language models are usable.
    pub fn check_parameters(&self) -> PrepResult<()> {
        let model = self.config.am_dir.join("final.mdl");
        if !model.is_file() {
            return Err(PrepError::config(format!(
                "non valid acoustic model: {} not found",
                model.display()
            )));
        }
        let phones = self.config.lm_dir.join("phones.txt");
        if !phones.is_file() {
            return Err(PrepError::config(format!(
                "non valid language model: {} not found",
                phones.display()
            )));
        }
        Ok(())
    }

    /// Set up the recipe data directory.
    ///
    /// The data files are hard-linked from the acoustic-model data
    /// directory instead of being re-prepared from the corpus; links that
    /// already exist are kept.
    pub fn create(&self) -> PrepResult<()> {
        self.check_parameters()?;

        let target_dir = self.config.recipe_dir.join("data").join("align");
        fs::create_dir_all(&target_dir)?;

        let data_dir = acoustic_data_dir(&self.config.am_dir);
        for name in RECIPE_DATA_FILES {
            let origin = data_dir.join(name);
            let target = target_dir.join(name);
            if origin.is_file() && !target.is_file() {
                fs::hard_link(&origin, &target)?;
            }
        }
        Ok(())
    }

    /// Run the alignment pipeline and export the result.
    pub fn run(&self) -> PrepResult<PathBuf> {
        self.check_parameters()?;
        self.align_fmllr()?;
        let tra = self.ali_to_phones()?;
        self.export(&tra)
    }

    fn align_fmllr(&self) -> PrepResult<()> {
        let target = self.config.recipe_dir.join("exp").join("ali_fmllr");
        info!("computing forced alignment to {}", target.display());
        fs::create_dir_all(&target)?;

        let args = vec![
            "--nj".to_owned(),
            self.config.njobs.to_string(),
            "--cmd".to_owned(),
            self.config.train_cmd.clone(),
            self.config
                .recipe_dir
                .join("data")
                .join("align")
                .display()
                .to_string(),
            self.config.lm_dir.display().to_string(),
            self.config.am_dir.display().to_string(),
            target.display().to_string(),
        ];
        run_command("steps/align_fmllr.sh", &args, Some(&self.config.recipe_dir))?;
        Ok(())
    }

    fn ali_to_phones(&self) -> PrepResult<PathBuf> {
        let export_dir = self.config.recipe_dir.join("export");
        let target = export_dir.join("forced_alignment.tra");
        info!("exporting alignment to {}", target.display());
        fs::create_dir_all(&export_dir)?;

        let ali = self
            .config
            .recipe_dir
            .join("exp")
            .join("ali_fmllr")
            .join("ali.1.gz");
        let args = vec![
            "--write_lengths=true".to_owned(),
            self.config.am_dir.join("final.mdl").display().to_string(),
            format!("ark,t:gunzip -c {}|", ali.display()),
            format!("ark,t:{}", target.display()),
        ];
        run_command("ali-to-phones", &args, None)?;

        if !target.is_file() {
            return Err(PrepError::MissingArtifact(target));
        }
        Ok(target)
    }

    /// Convert the toolkit alignment into a plain-text phone alignment
    /// keyed by the language-model phone table.
    fn export(&self, tra: &Path) -> PrepResult<PathBuf> {
        let target = tra.with_extension("txt");
        let phone_map = read_phone_map(&self.config.lm_dir.join("phones.txt"), true)?;
        let content = export_phone_alignment(&phone_map, tra)?;
        write_manifest(&target, &content)?;
        Ok(target)
    }
}

fn acoustic_data_dir(am_dir: &Path) -> PathBuf {
    am_dir.join("..").join("..").join("data").join("acoustic")
}

/// Read a Kaldi phone table (`<symbol> <integer-id>` per line) into an
/// id-to-symbol map.
///
/// With `word_position_dependent` the position suffixes (`_B`, `_E`, `_I`,
/// `_S`) are folded back onto the base phone.
pub fn read_phone_map(
    phones_file: &Path,
    word_position_dependent: bool,
) -> PrepResult<HashMap<u32, String>> {
    let content = fs::read_to_string(phones_file)?;
    let mut map = HashMap::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (symbol, id) = line.split_once(' ').ok_or_else(|| {
            PrepError::parse(phones_file, "expected `<symbol> <id>`", line)
        })?;
        let id: u32 = id.trim().parse().map_err(|_| {
            PrepError::parse(phones_file, "phone id is not an integer", line)
        })?;
        let mut symbol = symbol.to_owned();
        if word_position_dependent {
            for suffix in ["_B", "_E", "_I", "_S"] {
                if let Some(base) = symbol.strip_suffix(suffix) {
                    symbol = base.to_owned();
                    break;
                }
            }
        }
        map.insert(id, symbol);
    }
    Ok(map)
}

/// Convert a `.tra` alignment (`<utt-id> <phone-id> <frames> ; ...`) into
/// `<utt-id> <start> <stop> <phone>` lines at the standard frame shift.
pub fn export_phone_alignment(
    phone_map: &HashMap<u32, String>,
    tra: &Path,
) -> PrepResult<String> {
    let content = fs::read_to_string(tra)?;
    let mut out = String::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (utt_id, entries) = line.split_once(' ').ok_or_else(|| {
            PrepError::parse(tra, "expected `<utt-id> <alignment>`", line)
        })?;

        let mut start = 0.0f64;
        for entry in entries.split(" ; ") {
            let mut fields = entry.split_whitespace();
            let (Some(id), Some(frames)) = (fields.next(), fields.next()) else {
                return Err(PrepError::parse(tra, "expected `<phone-id> <frames>`", line));
            };
            let id: u32 = id.parse().map_err(|_| {
                PrepError::parse(tra, "phone id is not an integer", line)
            })?;
            let frames: u64 = frames.parse().map_err(|_| {
                PrepError::parse(tra, "frame count is not an integer", line)
            })?;
            let phone = phone_map.get(&id).ok_or_else(|| {
                PrepError::parse(tra, format!("unknown phone id {id}"), line)
            })?;

            let stop = start + frames as f64 * FRAME_SHIFT;
            out.push_str(&format!("{utt_id} {start:.3} {stop:.3} {phone}\n"));
            start = stop;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_phone_map_folds_position_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let phones = dir.path().join("phones.txt");
        fs::write(&phones, "<eps> 0\nSIL 1\nAA_B 2\nAA_E 3\nAA_I 4\nAA_S 5\n").unwrap();

        let map = read_phone_map(&phones, true).unwrap();
        assert_eq!(map[&2], "AA");
        assert_eq!(map[&5], "AA");
        assert_eq!(map[&1], "SIL");

        let raw = read_phone_map(&phones, false).unwrap();
        assert_eq!(raw[&2], "AA_B");
    }

    #[test]
    fn test_export_phone_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let tra = dir.path().join("forced_alignment.tra");
        fs::write(&tra, "4k0c0301 1 3 ; 2 5\n").unwrap();

        let map: HashMap<u32, String> =
            [(1, "SIL".to_owned()), (2, "AA".to_owned())].into();
        let out = export_phone_alignment(&map, &tra).unwrap();
        assert_eq!(
            out,
            "4k0c0301 0.000 0.030 SIL\n4k0c0301 0.030 0.080 AA\n"
        );
    }

    #[test]
    fn test_export_unknown_phone_id_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tra = dir.path().join("forced_alignment.tra");
        fs::write(&tra, "4k0c0301 9 3\n").unwrap();

        let err = export_phone_alignment(&HashMap::new(), &tra).unwrap_err();
        assert!(matches!(err, PrepError::Parse { .. }));
    }

    #[test]
    fn test_check_parameters_requires_model_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = AlignConfig::new(
            dir.path().join("recipe"),
            dir.path().join("lm"),
            dir.path().join("am"),
        );
        let aligner = ForceAlign::new(config);
        let err = aligner.check_parameters().unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));

        fs::create_dir_all(dir.path().join("am")).unwrap();
        fs::write(dir.path().join("am").join("final.mdl"), b"").unwrap();
        let err = aligner.check_parameters().unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_create_links_available_data_files() {
        let dir = tempfile::tempdir().unwrap();
        let am_dir = dir.path().join("exp").join("am").join("tri2a");
        let lm_dir = dir.path().join("lm");
        let data_dir = dir.path().join("exp").join("data").join("acoustic");
        fs::create_dir_all(&am_dir).unwrap();
        fs::create_dir_all(&lm_dir).unwrap();
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(am_dir.join("final.mdl"), b"").unwrap();
        fs::write(lm_dir.join("phones.txt"), "SIL 1\n").unwrap();
        fs::write(data_dir.join("text"), b"u1 HELLO\n").unwrap();
        fs::write(data_dir.join("utt2spk"), b"u1 u1s\n").unwrap();

        let aligner = ForceAlign::new(AlignConfig::new(
            dir.path().join("recipe"),
            lm_dir,
            am_dir,
        ));
        aligner.create().unwrap();

        let align_dir = dir.path().join("recipe").join("data").join("align");
        assert!(align_dir.join("text").is_file());
        assert!(align_dir.join("utt2spk").is_file());
        // absent sources are simply skipped
        assert!(!align_dir.join("feats.scp").exists());

        // re-running create() keeps existing links
        aligner.create().unwrap();
    }
}
