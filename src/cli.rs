//! Command-line interface for polysub
//!
//! Provides argument parsing using clap derive macros. Running without a
//! subcommand transcribes the given source; subcommands cover the caption
//! path, diagnostics, configuration, and completions.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Chunked transcription with speaker-attributed, translatable sentences
#[derive(Parser, Debug)]
#[command(
    name = "polysub",
    version = crate::version_string(),
    about = "Chunked transcription with speaker-attributed, translatable sentences"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video URL or local audio file to transcribe
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-chunk progress)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Target language for translation (e.g., ko, ja, fr)
    #[arg(long, value_name = "LANG")]
    pub target_lang: Option<String>,

    /// Skip translation even when enabled in the config
    #[arg(long)]
    pub no_translate: bool,

    /// Chunk duration in seconds
    #[arg(long, value_name = "SECONDS")]
    pub chunk_secs: Option<f64>,

    /// Overlap between consecutive chunks in seconds
    #[arg(long, value_name = "SECONDS")]
    pub overlap_secs: Option<f64>,

    /// Maximum chunks when the source duration is unknown
    #[arg(long, value_name = "N")]
    pub max_chunks: Option<usize>,

    /// Stop dispatching new chunks after this long. Examples: 90s, 5m, 1h30m
    #[arg(long, value_name = "DURATION", value_parser = parse_deadline)]
    pub deadline: Option<Duration>,

    /// Directory for the transcription artifact
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the artifact JSON to stdout as well
    #[arg(long)]
    pub json: bool,
}

/// Parse a deadline string into a duration.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_deadline(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the caption track a video already carries
    Captions {
        /// Video id or URL
        video: String,

        /// Run the captions through the review model (correct + translate)
        #[arg(long)]
        review: bool,

        /// Print captions as JSON instead of cue lines
        #[arg(long)]
        json: bool,
    },

    /// Check system dependencies and credentials
    Check,

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., translate.target_language)
    Get {
        /// Dotted key path (e.g., audio.chunk_secs, recognizer.language)
        key: String,
    },
    /// Set a configuration value by key
    Set {
        /// Dotted key path (e.g., audio.chunk_secs, recognizer.language)
        key: String,
        /// Value to set
        value: String,
    },
    /// List current configuration values (optionally a single section)
    List {
        /// Config section to show (e.g., audio, translate)
        section: Option<String>,
    },
    /// Print a commented configuration template
    Dump,
}
