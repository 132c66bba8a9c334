//! Per-chunk transcription onto the global timeline.

use crate::error::{PolysubError, Result};
use crate::segment::AudioChunk;
use crate::transcript::WordToken;
use crate::transcript::recognizer::SpeechRecognizer;

/// Runs one chunk through a recognizer and rebases the word times.
pub struct ChunkTranscriber<R> {
    recognizer: R,
}

impl<R: SpeechRecognizer> ChunkTranscriber<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Transcribe one chunk into globally-timed words.
    ///
    /// Only the recognizer's last result group is kept. Word times come back
    /// relative to the chunk and are offset by the chunk's start here, so
    /// every chunk's output lives on the same timeline.
    pub async fn transcribe(&self, chunk: &AudioChunk) -> Result<Vec<WordToken>> {
        let audio = tokio::fs::read(&chunk.path)
            .await
            .map_err(|e| PolysubError::ChunkProcessing {
                index: chunk.index,
                message: format!("unreadable chunk file: {}", e),
            })?;

        let groups = self.recognizer.recognize(&audio).await.map_err(|e| {
            PolysubError::ChunkProcessing {
                index: chunk.index,
                message: e.to_string(),
            }
        })?;

        let Some(last) = groups.into_iter().next_back() else {
            return Ok(Vec::new());
        };

        Ok(last
            .words
            .into_iter()
            .map(|w| WordToken {
                start_secs: w.start_secs + chunk.start_offset_secs,
                end_secs: w.end_secs + chunk.start_offset_secs,
                ..w
            })
            .collect())
    }
}
