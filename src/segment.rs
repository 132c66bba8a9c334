//! Splitting a source into overlapping time windows.
//!
//! Consecutive windows share `overlap_secs` of audio so that sentences cut
//! at a window boundary reappear whole at the start of the next window; the
//! cross-chunk merge later collapses the duplicated material. The window
//! plan is a pure function of the durations; the [`Segmenter`] drives a
//! [`ChunkExtractor`] over that plan, or walks forward window by window
//! until end of stream when the total duration is unknown.

use crate::media::{ChunkExtractor, ExtractOutcome};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// One extracted, transcribable window of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub index: usize,
    pub start_offset_secs: f64,
    pub duration_secs: f64,
    pub path: PathBuf,
}

/// Window start offsets for a known total duration.
///
/// Windows advance by `chunk_secs - overlap_secs` each step, so the count is
/// the ceiling of `total / stride`; the final window may run past the end of
/// the source and comes back truncated.
pub fn plan_windows(total_secs: f64, chunk_secs: f64, overlap_secs: f64) -> Vec<f64> {
    let stride = chunk_secs - overlap_secs;
    if total_secs <= 0.0 || stride <= 0.0 {
        return Vec::new();
    }
    let count = (total_secs / stride).ceil() as usize;
    (0..count).map(|i| (i as f64 * stride).max(0.0)).collect()
}

/// Produces [`AudioChunk`]s for a source, in index order.
pub struct Segmenter<E> {
    extractor: E,
    work_dir: PathBuf,
    chunk_secs: f64,
    overlap_secs: f64,
    max_chunks: usize,
    quiet: bool,
}

impl<E: ChunkExtractor> Segmenter<E> {
    pub fn new(
        extractor: E,
        work_dir: PathBuf,
        chunk_secs: f64,
        overlap_secs: f64,
        max_chunks: usize,
        quiet: bool,
    ) -> Self {
        Self {
            extractor,
            work_dir,
            chunk_secs,
            overlap_secs,
            max_chunks,
            quiet,
        }
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!("chunk_{:03}.webm", index))
    }

    /// How many windows to attempt: the full plan when the duration is
    /// known, the safety cap when it is not.
    fn window_limit(&self, total_secs: Option<f64>) -> usize {
        match total_secs {
            Some(total) => plan_windows(total, self.chunk_secs, self.overlap_secs).len(),
            None => self.max_chunks,
        }
    }

    /// Extract window `index`, or `None` when splitting should stop.
    ///
    /// End of stream stops quietly; an extraction failure stops with a log
    /// line. Either way the chunks produced so far remain valid.
    async fn next_chunk(&self, source: &Path, index: usize) -> Option<AudioChunk> {
        let start = (index as f64 * (self.chunk_secs - self.overlap_secs)).max(0.0);
        let path = self.chunk_path(index);
        match self
            .extractor
            .extract(source, start, self.chunk_secs, &path)
            .await
        {
            Ok(ExtractOutcome::Extracted) => Some(AudioChunk {
                index,
                start_offset_secs: start,
                duration_secs: self.chunk_secs,
                path,
            }),
            Ok(ExtractOutcome::EndOfStream) => None,
            Err(e) => {
                if !self.quiet {
                    eprintln!("Chunk {} extraction failed: {}", index, e);
                }
                None
            }
        }
    }

    /// Stream chunks into `tx` as they are extracted, so transcription of
    /// chunk *i* can overlap extraction of chunk *i+1*. Returns the number
    /// of chunks produced.
    pub async fn run(
        &self,
        source: &Path,
        total_secs: Option<f64>,
        tx: &mpsc::Sender<AudioChunk>,
    ) -> usize {
        let limit = self.window_limit(total_secs);
        let mut produced = 0;
        for index in 0..limit {
            let Some(chunk) = self.next_chunk(source, index).await else {
                break;
            };
            produced += 1;
            if let Err(undelivered) = tx.send(chunk).await {
                let _ = tokio::fs::remove_file(&undelivered.0.path).await;
                break;
            }
        }
        produced
    }

    /// Extract all chunks and collect them in order.
    pub async fn split(&self, source: &Path, total_secs: Option<f64>) -> Vec<AudioChunk> {
        let limit = self.window_limit(total_secs);
        let mut chunks = Vec::new();
        for index in 0..limit {
            match self.next_chunk(source, index).await {
                Some(chunk) => chunks.push(chunk),
                None => break,
            }
        }
        chunks
    }
}
