//! The chunked transcription pipeline.
//!
//! Wires the stages together: a segmenter task streams extracted chunks
//! through a channel while a bounded set of recognition tasks drains it, so
//! chunk *i+1* is being extracted while chunk *i* is being recognized.
//! Recognition completes out of order; results are keyed by chunk index and
//! merged strictly in index order.

use crate::defaults;
use crate::error::Result;
use crate::media::ChunkExtractor;
use crate::segment::Segmenter;
use crate::transcript::chunk::ChunkTranscriber;
use crate::transcript::recognizer::SpeechRecognizer;
use crate::transcript::{CrossChunkMerger, Sentence, SentenceAssembler, TranscriptionReport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunk_secs: f64,
    pub overlap_secs: f64,
    pub max_chunks: usize,
    pub max_concurrent: usize,
    /// Overall wall-clock budget, checked between chunk iterations.
    pub deadline: Option<Duration>,
    pub work_dir: PathBuf,
    pub quiet: bool,
    pub verbose: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_secs: defaults::CHUNK_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            max_chunks: defaults::MAX_CHUNKS,
            max_concurrent: defaults::MAX_CONCURRENT_RECOGNITIONS,
            deadline: None,
            work_dir: std::env::temp_dir(),
            quiet: false,
            verbose: 0,
        }
    }
}

/// Drives source splitting, per-chunk recognition, sentence assembly and the
/// cross-chunk merge.
pub struct TranscriptionPipeline {
    extractor: Arc<dyn ChunkExtractor>,
    recognizer: Arc<dyn SpeechRecognizer>,
    options: PipelineOptions,
}

impl TranscriptionPipeline {
    pub fn new(
        extractor: Arc<dyn ChunkExtractor>,
        recognizer: Arc<dyn SpeechRecognizer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor,
            recognizer,
            options,
        }
    }

    /// Run the full pipeline over one source.
    ///
    /// Partial failures never abort the run: a chunk whose recognition fails
    /// contributes no sentences and is listed in the report, and a deadline
    /// expiry stops dispatch and marks the report truncated. Chunk files are
    /// removed as soon as they are transcribed.
    pub async fn run(&self, source: &Path, total_secs: Option<f64>) -> TranscriptionReport {
        let started = Instant::now();
        let (chunk_tx, mut chunk_rx) = mpsc::channel(self.options.max_concurrent.max(1));

        let segmenter = Segmenter::new(
            self.extractor.clone(),
            self.options.work_dir.clone(),
            self.options.chunk_secs,
            self.options.overlap_secs,
            self.options.max_chunks,
            self.options.quiet,
        );
        let seg_source = source.to_path_buf();
        let seg_task =
            tokio::spawn(async move { segmenter.run(&seg_source, total_secs, &chunk_tx).await });

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent.max(1)));
        let mut handles: Vec<(usize, JoinHandle<Result<Vec<Sentence>>>)> = Vec::new();
        let mut truncated = false;

        while let Some(chunk) = chunk_rx.recv().await {
            if let Some(limit) = self.options.deadline
                && started.elapsed() >= limit
            {
                truncated = true;
                let _ = tokio::fs::remove_file(&chunk.path).await;
                break;
            }

            let permit = semaphore.clone().acquire_owned().await;
            let recognizer = self.recognizer.clone();
            let index = chunk.index;
            let handle = tokio::spawn(async move {
                let _permit = permit;
                let transcriber = ChunkTranscriber::new(recognizer);
                let transcribed = transcriber.transcribe(&chunk).await;
                let _ = tokio::fs::remove_file(&chunk.path).await;
                let words = transcribed?;
                Ok(SentenceAssembler::default().assemble(&words))
            });
            handles.push((index, handle));
        }
        // Stops the segmenter after truncation and removes any chunk it had
        // already queued
        chunk_rx.close();
        while let Some(chunk) = chunk_rx.recv().await {
            let _ = tokio::fs::remove_file(&chunk.path).await;
        }

        let mut by_index: BTreeMap<usize, Vec<Sentence>> = BTreeMap::new();
        let mut failed_chunks = Vec::new();
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(sentences)) => {
                    if self.options.verbose > 0 {
                        eprintln!("Chunk {}: {} sentences", index, sentences.len());
                    }
                    by_index.insert(index, sentences);
                }
                Ok(Err(e)) => {
                    if !self.options.quiet {
                        eprintln!("Chunk {} dropped: {}", index, e);
                    }
                    failed_chunks.push(index);
                }
                Err(e) => {
                    if !self.options.quiet {
                        eprintln!("Chunk {} task panicked: {}", index, e);
                    }
                    failed_chunks.push(index);
                }
            }
        }
        let _ = seg_task.await;

        let mut merger = CrossChunkMerger::default();
        for sentences in by_index.into_values() {
            for sentence in sentences {
                merger.push(sentence);
            }
        }
        failed_chunks.sort_unstable();

        TranscriptionReport {
            sentences: merger.finish(),
            failed_chunks,
            truncated,
            translation_failures: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ExtractOutcome, MockChunkExtractor};
    use crate::transcript::WordToken;
    use crate::transcript::recognizer::MockRecognizer;

    fn word(text: &str, start: f64, end: f64, speaker: u32) -> WordToken {
        WordToken {
            text: text.to_string(),
            start_secs: start,
            end_secs: end,
            speaker_id: speaker,
        }
    }

    /// Sequential options so scripted recognizer results map to chunk order.
    fn options(dir: &Path) -> PipelineOptions {
        PipelineOptions {
            work_dir: dir.to_path_buf(),
            max_concurrent: 1,
            quiet: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_run_known_duration() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockChunkExtractor::new());
        let recognizer = Arc::new(
            MockRecognizer::new()
                .with_words(vec![word("first.", 1.0, 2.0, 0)])
                .with_words(vec![word("second.", 2.0, 3.0, 0)])
                .with_words(vec![word("third.", 3.0, 4.0, 0)]),
        );
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        let report = pipeline.run(Path::new("/src.webm"), Some(130.0)).await;
        assert!(report.is_complete());
        assert_eq!(report.sentences.len(), 3);
        assert_eq!(report.sentences[0].text, "first.");
        // Chunk offsets 0 / 55 / 110 rebase the chunk-relative times
        assert_eq!(report.sentences[0].start_secs, 1.0);
        assert_eq!(report.sentences[1].start_secs, 57.0);
        assert_eq!(report.sentences[2].start_secs, 113.0);
    }

    #[tokio::test]
    async fn test_chunk_files_removed_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockChunkExtractor::new());
        let recognizer = Arc::new(MockRecognizer::new());
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        pipeline.run(Path::new("/src.webm"), Some(130.0)).await;

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_failed_chunk_recorded_and_rest_kept() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockChunkExtractor::new());
        let recognizer = Arc::new(
            MockRecognizer::new()
                .with_words(vec![word("zero.", 0.0, 1.0, 0)])
                .with_error("backend unavailable")
                .with_words(vec![word("two.", 0.0, 1.0, 0)]),
        );
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        let report = pipeline.run(Path::new("/src.webm"), Some(130.0)).await;
        assert!(!report.is_complete());
        assert_eq!(report.failed_chunks, vec![1]);
        assert_eq!(report.sentences.len(), 2);
        assert_eq!(report.sentences[0].text, "zero.");
        assert_eq!(report.sentences[1].text, "two.");
    }

    #[tokio::test]
    async fn test_unknown_duration_stops_at_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(
            MockChunkExtractor::new()
                .with_outcome(ExtractOutcome::Extracted)
                .with_outcome(ExtractOutcome::Extracted)
                .with_outcome(ExtractOutcome::EndOfStream),
        );
        let recognizer = Arc::new(
            MockRecognizer::new()
                .with_words(vec![word("one.", 0.0, 1.0, 0)])
                .with_words(vec![word("two.", 0.0, 1.0, 0)]),
        );
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        let report = pipeline.run(Path::new("/src.webm"), None).await;
        assert!(report.is_complete());
        assert_eq!(report.sentences.len(), 2);
    }

    #[tokio::test]
    async fn test_boundary_fragments_merge_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockChunkExtractor::new());
        // Chunk 0 ends mid-sentence; chunk 1 (offset 55) carries the rest
        let recognizer = Arc::new(
            MockRecognizer::new()
                .with_words(vec![word("cut", 58.0, 58.8, 0), word("off", 58.9, 59.5, 0)])
                .with_words(vec![word("continued.", 4.8, 5.5, 0)]),
        );
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        let report = pipeline.run(Path::new("/src.webm"), Some(110.0)).await;
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.sentences[0].text, "cut off continued.");
        assert_eq!(report.sentences[0].start_secs, 58.0);
        assert_eq!(report.sentences[0].end_secs, 60.5);
    }

    #[tokio::test]
    async fn test_zero_deadline_truncates_before_recognition() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockChunkExtractor::new());
        let recognizer = Arc::new(MockRecognizer::new());
        let pipeline = TranscriptionPipeline::new(
            extractor,
            recognizer.clone(),
            PipelineOptions {
                deadline: Some(Duration::ZERO),
                ..options(dir.path())
            },
        );

        let report = pipeline.run(Path::new("/src.webm"), Some(130.0)).await;
        assert!(report.truncated);
        assert!(report.sentences.is_empty());
        assert_eq!(recognizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_yields_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let extractor =
            Arc::new(MockChunkExtractor::new().with_outcome(ExtractOutcome::EndOfStream));
        let recognizer = Arc::new(MockRecognizer::new());
        let pipeline = TranscriptionPipeline::new(extractor, recognizer, options(dir.path()));

        let report = pipeline.run(Path::new("/src.webm"), None).await;
        assert!(report.is_complete());
        assert!(report.sentences.is_empty());
    }
}
