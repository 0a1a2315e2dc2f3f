use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use corpusprep::{
    all_variants, variant_by_name, AlignConfig, ForceAlign, PrepareConfig, Preparator,
};

#[derive(Parser)]
#[command(name = "corpusprep")]
#[command(author, version, about = "Speech corpus preparation and forced-alignment pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a raw corpus distribution into the standardized format
    Prepare {
        /// Input directory containing the raw corpus distribution
        input_dir: PathBuf,

        /// CMU dictionary file to use for lexicon generation
        cmu_dict: PathBuf,

        /// Output directory (defaults to ./prepared/<variant>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Corpus sub-variant to prepare (full corpus if not specified)
        #[arg(short, long, default_value = "full")]
        selection: String,

        /// Clear a pre-existing output directory
        #[arg(long)]
        overwrite: bool,

        /// Skip the post-preparation validation pass
        #[arg(long)]
        no_validation: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run forced alignment of a prepared corpus with the external toolkit
    Align {
        /// Recipe directory to compute the alignment in
        recipe_dir: PathBuf,

        /// Language-model directory (must contain phones.txt)
        #[arg(long)]
        lm_dir: PathBuf,

        /// Acoustic-model directory (must contain final.mdl)
        #[arg(long)]
        am_dir: PathBuf,

        /// Number of parallel toolkit jobs
        #[arg(long, default_value = "1")]
        njobs: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Prepare {
            input_dir,
            cmu_dict,
            output,
            selection,
            overwrite,
            no_validation,
            verbose,
        } => {
            setup_logging(verbose);
            prepare_corpus(
                input_dir,
                cmu_dict,
                output,
                &selection,
                overwrite,
                no_validation,
            )
        }
        Commands::Align {
            recipe_dir,
            lm_dir,
            am_dir,
            njobs,
            verbose,
        } => {
            setup_logging(verbose);
            align_corpus(recipe_dir, lm_dir, am_dir, njobs)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn prepare_corpus(
    input_dir: PathBuf,
    cmu_dict: PathBuf,
    output: Option<PathBuf>,
    selection: &str,
    overwrite: bool,
    no_validation: bool,
) -> Result<()> {
    let variant = variant_by_name(selection).with_context(|| {
        let known: Vec<&str> = all_variants().iter().map(|v| v.name).collect();
        format!("unknown selection `{selection}`, choose one of {known:?}")
    })?;

    let output_dir =
        output.unwrap_or_else(|| PathBuf::from("prepared").join(variant.name));

    let mut config = PrepareConfig::new(input_dir, cmu_dict, output_dir, variant);
    config.overwrite = overwrite;

    let preparator =
        Preparator::new(config).context("Failed to initialize the preparator")?;
    let summary = preparator.prepare().context("Preparation failed")?;

    info!(
        "prepared {} utterances ({} excluded as corrupted), {} lexicon entries",
        summary.transcription_entries, summary.excluded_utterances, summary.lexicon_entries
    );

    if no_validation {
        info!("skipping validation (--no-validation)");
        return Ok(());
    }

    let report = preparator.validate().context("Validation failed to run")?;
    if !report.is_ok() {
        for violation in &report.violations {
            eprintln!("violation: {violation:?}");
        }
        anyhow::bail!("validation found {} violation(s)", report.violations.len());
    }

    info!("corpus is consistent");
    Ok(())
}

fn align_corpus(
    recipe_dir: PathBuf,
    lm_dir: PathBuf,
    am_dir: PathBuf,
    njobs: usize,
) -> Result<()> {
    let mut config = AlignConfig::new(recipe_dir, lm_dir, am_dir);
    config.njobs = njobs;

    let aligner = ForceAlign::new(config);
    aligner
        .create()
        .context("Failed to set up the alignment recipe")?;
    let exported = aligner.run().context("Forced alignment failed")?;

    info!("phone alignment exported to {}", exported.display());
    Ok(())
}
