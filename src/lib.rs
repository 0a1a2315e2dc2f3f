pub mod align;
pub mod error;
pub mod io;
pub mod models;
pub mod process;
pub mod stages;

pub use align::{AlignConfig, ForceAlign};
pub use error::{PrepError, PrepResult};
pub use io::{detect_corrupted_utterances, select_files, BAD_RECORDING_MARKER};
pub use models::{
    all_variants, parse_transcript_line, speaker_id, variant_by_name, CorpusVariant,
};
pub use process::{run_command, CommandResult};
pub use stages::{
    normalize_text, normalize_token, validate_corpus, CorpusLayout, PrepareConfig,
    PrepareSummary, Preparator, ValidationReport, Violation, NOISE_WORD,
};
