pub mod lexicon;
pub mod normalize;
pub mod phones;
pub mod segments;
pub mod speaker;
pub mod transcription;
pub mod validate;
pub mod wavs;

pub use lexicon::*;
pub use normalize::*;
pub use phones::*;
pub use segments::*;
pub use speaker::*;
pub use transcription::*;
pub use validate::*;
pub use wavs::*;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{PrepError, PrepResult};
use crate::io::{
    detect_corrupted_utterances, select_files, write_json_report, RECORDING_EXTENSION,
    TRANSCRIPT_EXTENSION,
};
use crate::models::CorpusVariant;

/// Configuration for one preparation run.
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Raw corpus distribution to read from
    pub input_dir: PathBuf,
    /// CMU pronunciation dictionary used for lexicon generation
    pub cmu_dict: PathBuf,
    /// Directory to write the prepared corpus into
    pub output_dir: PathBuf,
    /// Corpus sub-style governing file selection and phone inventory
    pub variant: &'static CorpusVariant,
    /// Clear a pre-existing output directory instead of failing
    pub overwrite: bool,
    /// Extension of the raw recording files
    pub recording_extension: String,
    /// Extension of the raw transcription files
    pub transcript_extension: String,
}

impl PrepareConfig {
    pub fn new(
        input_dir: PathBuf,
        cmu_dict: PathBuf,
        output_dir: PathBuf,
        variant: &'static CorpusVariant,
    ) -> Self {
        Self {
            input_dir,
            cmu_dict,
            output_dir,
            variant,
            overwrite: false,
            recording_extension: RECORDING_EXTENSION.to_owned(),
            transcript_extension: TRANSCRIPT_EXTENSION.to_owned(),
        }
    }
}

/// Fixed file layout of a prepared corpus.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    pub data_dir: PathBuf,
    pub wavs_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub segments_file: PathBuf,
    pub speaker_file: PathBuf,
    pub transcription_file: PathBuf,
    pub lexicon_file: PathBuf,
    pub phones_file: PathBuf,
    pub silences_file: PathBuf,
    pub variants_file: PathBuf,
}

impl CorpusLayout {
    pub fn new(output_dir: &Path) -> Self {
        let data_dir = output_dir.join("data");
        Self {
            wavs_dir: data_dir.join("wavs"),
            logs_dir: output_dir.join("logs"),
            segments_file: data_dir.join("segments.txt"),
            speaker_file: data_dir.join("utt2spk.txt"),
            transcription_file: data_dir.join("text.txt"),
            lexicon_file: data_dir.join("lexicon.txt"),
            phones_file: data_dir.join("phones.txt"),
            silences_file: data_dir.join("silences.txt"),
            variants_file: data_dir.join("variants.txt"),
            data_dir,
        }
    }
}

/// Counters of one preparation run, written to `logs/prepare_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareSummary {
    pub variant: String,
    pub recordings_selected: usize,
    pub transcripts_selected: usize,
    pub excluded_utterances: usize,
    pub recordings_converted: usize,
    pub segments: usize,
    pub speaker_entries: usize,
    pub transcription_entries: usize,
    pub lexicon_entries: usize,
}

/// Orchestrates the preparation pipeline.
///
/// Construction validates the configuration, selects the input files and
/// computes the exclusion set; `prepare()` then runs the ordered emission
/// steps and `validate()` checks the written manifests. The exclusion set
/// and file lists are read-only after construction, so each step is
/// stateless and individually re-runnable.
#[derive(Debug)]
pub struct Preparator {
    config: PrepareConfig,
    layout: CorpusLayout,
    recordings: Vec<PathBuf>,
    transcripts: Vec<PathBuf>,
    excluded: HashSet<String>,
}

impl Preparator {
    /// Validate the configuration and scan the input corpus.
    ///
    /// Fails before anything is written: a pre-existing output directory
    /// (without `overwrite`), a missing input directory or a missing
    /// dictionary all abort with a configuration error and leave no partial
    /// output tree behind.
    pub fn new(config: PrepareConfig) -> PrepResult<Self> {
        if !config.input_dir.is_dir() {
            return Err(PrepError::config(format!(
                "input directory does not exist: {}",
                config.input_dir.display()
            )));
        }
        if !config.cmu_dict.is_file() {
            return Err(PrepError::config(format!(
                "CMU dictionary does not exist: {}",
                config.cmu_dict.display()
            )));
        }
        if config.output_dir.exists() {
            if config.overwrite {
                fs::remove_dir_all(&config.output_dir)?;
            } else {
                return Err(PrepError::config(format!(
                    "output directory already exists: {}",
                    config.output_dir.display()
                )));
            }
        }

        let recordings = select_files(
            &config.input_dir,
            config.variant,
            &config.recording_extension,
        )?;
        let transcripts = select_files(
            &config.input_dir,
            config.variant,
            &config.transcript_extension,
        )?;
        info!(
            "selected {} speech files and {} transcription files",
            recordings.len(),
            transcripts.len()
        );

        let excluded = detect_corrupted_utterances(&transcripts)?;
        info!("found {} corrupted utterances", excluded.len());

        let layout = CorpusLayout::new(&config.output_dir);
        fs::create_dir_all(&layout.wavs_dir)?;
        fs::create_dir_all(&layout.logs_dir)?;

        Ok(Self {
            config,
            layout,
            recordings,
            transcripts,
            excluded,
        })
    }

    /// Run the ordered preparation steps.
    pub fn prepare(&self) -> PrepResult<PrepareSummary> {
        info!(
            "preparing the {} corpus, writing to {}",
            self.config.variant.name,
            self.layout.data_dir.display()
        );

        info!("writing wavs");
        let recordings_converted =
            convert_recordings(&self.recordings, &self.layout.wavs_dir, &self.excluded)?;

        info!("writing segments.txt");
        let segments = emit_segments(&self.layout.wavs_dir, &self.layout.segments_file)?;

        info!("writing utt2spk.txt");
        let speaker_entries = emit_speaker_map(
            &self.layout.wavs_dir,
            &self.layout.speaker_file,
            self.config.variant.speaker_prefix_len,
        )?;

        info!("writing text.txt");
        let transcription_entries = emit_transcription(
            &self.transcripts,
            &self.excluded,
            &self.layout.transcription_file,
        )?;

        info!("writing lexicon.txt");
        let lexicon_entries = emit_lexicon(&self.config.cmu_dict, &self.layout.lexicon_file)?;

        info!("writing phones.txt");
        emit_phone_inventory(
            self.config.variant,
            &self.layout.phones_file,
            &self.layout.silences_file,
            &self.layout.variants_file,
        )?;

        let summary = PrepareSummary {
            variant: self.config.variant.name.to_owned(),
            recordings_selected: self.recordings.len(),
            transcripts_selected: self.transcripts.len(),
            excluded_utterances: self.excluded.len(),
            recordings_converted,
            segments,
            speaker_entries,
            transcription_entries,
            lexicon_entries,
        };
        write_json_report(&self.layout.logs_dir.join("prepare_report.json"), &summary)?;
        Ok(summary)
    }

    /// Consistency check of the written manifests; the report is also
    /// written to `logs/validation.json`.
    pub fn validate(&self) -> PrepResult<ValidationReport> {
        info!("validating the prepared {} corpus", self.config.variant.name);
        let report = validate_corpus(&self.layout.data_dir, &self.excluded)?;
        write_json_report(&self.layout.logs_dir.join("validation.json"), &report)?;
        Ok(report)
    }

    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::variant::JOURNALIST_READ;

    /// Lay out a small raw corpus with one corrupted utterance, using wav
    /// recordings so no external conversion tool is needed.
    fn fake_corpus(root: &Path) {
        let leaf = root.join("wsj0").join("si_tr_j").join("4k0");
        fs::create_dir_all(&leaf).unwrap();
        fs::write(
            leaf.join("4k0c03.dot"),
            "THE <DOOR> SLAMMED [loud_breath] (4k0c0301)\n\
             A LINE WITH A [bad_recording] (4k0c0302)\n\
             TEN %PERCENT MORE (4k0c0303)\n",
        )
        .unwrap();
        for utt in ["4k0c0301", "4k0c0302", "4k0c0303"] {
            fs::write(leaf.join(format!("{utt}.wav")), b"RIFF").unwrap();
        }
    }

    fn fake_dict(path: &Path) {
        fs::write(
            path,
            ";;; header comment\n\
             THE  DH AH0\n\
             DOOR  D AO1 R\n\
             SLAMMED  S L AE1 M D\n\
             TEN  T EH1 N\n\
             PERCENT  P ER0 S EH1 N T\n\
             MORE  M AO1 R\n\
             MORE(1)  M OW1 R\n\
             A  AH0\n",
        )
        .unwrap();
    }

    fn test_config(dir: &Path) -> PrepareConfig {
        let input = dir.join("raw");
        fake_corpus(&input);
        let dict = dir.join("cmudict");
        fake_dict(&dict);
        let mut config = PrepareConfig::new(
            input,
            dict,
            dir.join("prepared"),
            &JOURNALIST_READ,
        );
        config.recording_extension = ".wav".to_owned();
        config
    }

    #[test]
    fn test_prepare_and_validate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let prep = Preparator::new(test_config(dir.path())).unwrap();

        assert_eq!(prep.excluded().len(), 1);
        assert!(prep.excluded().contains("4k0c0302"));

        let summary = prep.prepare().unwrap();
        assert_eq!(summary.recordings_selected, 3);
        assert_eq!(summary.recordings_converted, 2);
        assert_eq!(summary.segments, 2);
        assert_eq!(summary.transcription_entries, 2);

        // the corrupted utterance is absent from every manifest
        for manifest in [
            &prep.layout().segments_file,
            &prep.layout().speaker_file,
            &prep.layout().transcription_file,
        ] {
            let content = fs::read_to_string(manifest).unwrap();
            assert!(!content.contains("4k0c0302"), "{}", manifest.display());
        }

        let text = fs::read_to_string(&prep.layout().transcription_file).unwrap();
        assert!(text.contains("4k0c0301 THE DOOR SLAMMED <noise>\n"));
        assert!(text.contains("4k0c0303 TEN PERCENT MORE\n"));

        let report = prep.validate().unwrap();
        assert!(report.is_ok(), "{:?}", report.violations);
        assert!(prep.layout().logs_dir.join("validation.json").is_file());
        assert!(prep.layout().logs_dir.join("prepare_report.json").is_file());
    }

    #[test]
    fn test_existing_output_dir_is_fatal_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.output_dir).unwrap();

        let err = Preparator::new(config.clone()).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));

        let mut config = config;
        config.overwrite = true;
        assert!(Preparator::new(config).is_ok());
    }

    #[test]
    fn test_missing_dictionary_is_fatal_before_output_creation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.cmu_dict = dir.path().join("no-such-dict");

        let err = Preparator::new(config.clone()).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_steps_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let prep = Preparator::new(test_config(dir.path())).unwrap();
        prep.prepare().unwrap();
        let first = fs::read(&prep.layout().transcription_file).unwrap();
        prep.prepare().unwrap();
        assert_eq!(first, fs::read(&prep.layout().transcription_file).unwrap());
    }
}
