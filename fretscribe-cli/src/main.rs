//! # fretscribe - guitar tablature from audio
//!
//! Command-line front-end for `fretscribe-core`. It supplies the audio (a WAV
//! file or a live take from the default input device), runs the
//! transcription pipeline and writes out the tablature and song metadata.

mod capture;
mod settings;
mod wav;

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use fretscribe_core::{
    DetectionMode, Difficulty, SampleBuffer, TranscriptionConfig, TuningPreset, transcribe,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Longest take `record` accepts, in seconds.
const MAX_RECORD_SECONDS: f32 = 600.0;

#[derive(Parser, Debug)]
#[command(
    name = "fretscribe",
    version,
    about = "Transcribe single-note guitar audio into tablature"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcribe a WAV file
    Transcribe {
        input: PathBuf,
        #[command(flatten)]
        options: TranscribeOptions,
    },
    /// Record from the default input device, then transcribe the take
    Record {
        /// Length of the take in seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f32,
        #[command(flatten)]
        options: TranscribeOptions,
    },
    /// List the built-in tunings and difficulty levels
    Tunings,
}

#[derive(Args, Debug)]
struct TranscribeOptions {
    /// JSON settings file; the flags below override its values
    #[arg(long)]
    settings: Option<PathBuf>,
    /// standard, dropd, halfdrop, fulldrop or dropc
    #[arg(short, long)]
    tuning: Option<String>,
    /// beginner, intermediate or advanced
    #[arg(short, long)]
    difficulty: Option<String>,
    /// Style label printed in the header
    #[arg(short, long)]
    style: Option<String>,
    /// Analyze windows on this many worker threads
    #[arg(short, long)]
    workers: Option<usize>,
    /// Keep every window's candidate instead of skipping near-duplicates
    #[arg(long)]
    no_prefilter: bool,
    /// Write the tablature here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write the song metadata and diagnostics as JSON
    #[arg(long)]
    metadata_json: Option<PathBuf>,
    /// Write the effective settings as JSON
    #[arg(long)]
    save_settings: Option<PathBuf>,
    /// Print the merged note list
    #[arg(long)]
    notes: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so the tablature can be piped from stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fretscribe=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Transcribe { input, options } => {
            let config = resolve_config(&options)?;
            let buffer = wav::read_wav(&input)?;
            info!(
                "Loaded {} ({:.2}s at {} Hz)",
                input.display(),
                buffer.duration_sec(),
                buffer.sample_rate()
            );
            run(&buffer, &config, &options)
        }
        Command::Record { seconds, options } => {
            let take = take_length(seconds)?;
            let config = resolve_config(&options)?;
            let buffer = capture::record(take)?;
            run(&buffer, &config, &options)
        }
        Command::Tunings => {
            list_tunings();
            Ok(())
        }
    }
}

/// Checks `--seconds` and turns it into a capture duration.
fn take_length(seconds: f32) -> Result<Duration> {
    ensure!(
        seconds > 0.0 && seconds <= MAX_RECORD_SECONDS,
        "--seconds must be in (0, {MAX_RECORD_SECONDS}], got {seconds}"
    );
    Duration::try_from_secs_f32(seconds).context("Invalid --seconds value")
}

/// Builds the effective settings: defaults, then the settings file, then flags.
fn resolve_config(options: &TranscribeOptions) -> Result<TranscriptionConfig> {
    let mut config = match &options.settings {
        Some(path) => settings::load_settings(path)?,
        None => TranscriptionConfig::default(),
    };

    if let Some(tuning) = &options.tuning {
        config.tuning = tuning.parse()?;
    }
    if let Some(difficulty) = &options.difficulty {
        config.difficulty = difficulty.parse()?;
    }
    if let Some(style) = &options.style {
        config.style = style.clone();
    }
    if let Some(workers) = options.workers {
        config.detection = DetectionMode::Parallel { workers };
    }
    if options.no_prefilter {
        config.dedup_prefilter = false;
    }
    config.validate()?;

    if let Some(path) = &options.save_settings {
        settings::save_settings(&config, path)?;
        info!("Settings saved to {}", path.display());
    }
    Ok(config)
}

fn run(
    buffer: &SampleBuffer,
    config: &TranscriptionConfig,
    options: &TranscribeOptions,
) -> Result<()> {
    let result = transcribe(buffer, config)?;

    let render = result.diagnostics.render;
    if render.unmapped > 0 {
        warn!(
            "{} of {} notes cannot be played with {} tuning at {} level",
            render.unmapped,
            result.notes.len(),
            config.tuning,
            config.difficulty
        );
    }
    if render.truncated > 0 {
        warn!("{} notes fall after the last rendered measure", render.truncated);
    }

    let text = result.tablature.to_text();
    match &options.output {
        Some(path) => {
            fs::write(path, &text)?;
            info!("Tablature written to {}", path.display());
        }
        None => print!("{text}"),
    }

    if options.notes {
        println!();
        for note in &result.notes {
            println!(
                "{:>7.3}s  {:<4} {:>7.2} Hz  {:.3}s  vel {:.2}",
                note.start_time_sec,
                note.name(),
                note.frequency_hz,
                note.duration_sec,
                note.velocity
            );
        }
    }

    let metadata = &result.metadata;
    info!(
        "Tempo {} BPM, key {}, {} notes over {:.1}s",
        metadata.bpm, metadata.key, metadata.note_count, metadata.duration_sec
    );

    if let Some(path) = &options.metadata_json {
        let export = serde_json::json!({
            "metadata": metadata,
            "diagnostics": result.diagnostics,
        });
        settings::write_json(&export, path)?;
        info!("Metadata written to {}", path.display());
    }
    Ok(())
}

fn list_tunings() {
    println!("Tunings:");
    for preset in TuningPreset::ALL {
        let tuning = preset.tuning();
        let names = tuning.string_names().join(" ");
        println!(
            "  {:<9} {:<15} {:<18} {:?}",
            preset.key(),
            preset.display_name(),
            names,
            tuning.strings
        );
    }
    println!("Difficulty levels:");
    for difficulty in Difficulty::ALL {
        println!("  {:<13} max fret {}", difficulty.key(), difficulty.max_fret());
    }
}
