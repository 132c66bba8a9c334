//! Word-to-sentence transcription core.
//!
//! One chunk's recognition output is a time-ordered stream of speaker-tagged
//! words. [`assembler::SentenceAssembler`] folds that stream into sentences,
//! [`merger::CrossChunkMerger`] stitches sentences across chunk boundaries
//! (collapsing the overlap-window duplicates), and
//! [`pipeline::TranscriptionPipeline`] wires the whole path together.

pub mod assembler;
pub mod chunk;
pub mod merger;
pub mod pipeline;
pub mod recognizer;

pub use assembler::SentenceAssembler;
pub use chunk::ChunkTranscriber;
pub use merger::CrossChunkMerger;
pub use pipeline::{PipelineOptions, TranscriptionPipeline};
pub use recognizer::{MockRecognizer, SpeechRecognizer, WordGroup};

use serde::{Deserialize, Serialize};

/// One recognized word on the global timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
    pub speaker_id: u32,
}

/// One speaker-attributed sentence.
///
/// Serialized field names match the persisted artifact layout; a sentence
/// that was never translated carries no `translatedText` field at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(rename = "startTime")]
    pub start_secs: f64,
    #[serde(rename = "endTime")]
    pub end_secs: f64,
    pub text: String,
    #[serde(
        rename = "translatedText",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub translated_text: Option<String>,
    #[serde(rename = "speakerId")]
    pub speaker_id: u32,
}

impl Sentence {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Everything one pipeline run produced, including how incomplete it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionReport {
    /// Chronological, non-overlapping sentence sequence.
    pub sentences: Vec<Sentence>,
    /// Indices of chunks whose recognition failed and contributed nothing.
    pub failed_chunks: Vec<usize>,
    /// True when the deadline stopped the run before the source was exhausted.
    pub truncated: bool,
    /// Number of sentences left untranslated after a translation failure.
    pub translation_failures: usize,
}

impl TranscriptionReport {
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty() && !self.truncated
    }
}
