//! polysub - chunked transcription with speaker-attributed sentences
//!
//! Splits long audio into overlapping chunks, recognizes them concurrently,
//! folds word-level results into sentences, and merges fragments across chunk
//! boundaries. Optional translation and an LLM caption-review path.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod artifact;
pub mod captions;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod media;
pub mod remote;
pub mod segment;
pub mod transcript;
pub mod translate;

// Core traits (extract → recognize → translate), each with a cloud and a mock
// implementation
pub use captions::CaptionSource;
pub use media::{ChunkExtractor, CommandExecutor, SystemCommandExecutor};
pub use transcript::SpeechRecognizer;
pub use translate::Translator;

// Pipeline
pub use segment::{AudioChunk, Segmenter};
pub use transcript::{
    PipelineOptions, Sentence, TranscriptionPipeline, TranscriptionReport, WordToken,
};

// Error handling
pub use error::{PolysubError, Result};

// Config
pub use config::Config;

// Artifacts
pub use artifact::Artifact;

/// Package version, extended with the git short hash when the build embedded
/// one (`"0.2.0+abc1234"`, plain `"0.2.0"` otherwise).
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
