//! Per-window audio extraction via ffmpeg.
//!
//! Splitting a source of unknown length means asking ffmpeg for windows past
//! the end of the data. ffmpeg reports that through stderr of a failed run
//! ("End of file", or "Invalid data found when processing input" for a
//! truncated trailing fragment), and a request landing exactly on the end
//! produces an empty output file. All three are normal termination, not
//! errors, and map to [`ExtractOutcome::EndOfStream`].

use crate::error::{PolysubError, Result};
use crate::media::executor::CommandExecutor;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Outcome of extracting one time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The window was written to the output path.
    Extracted,
    /// The source ended at or before this window; nothing usable was written.
    EndOfStream,
}

/// Capability to materialize one time window of a source as a standalone file.
#[async_trait]
pub trait ChunkExtractor: Send + Sync {
    /// Extract `[start_secs, start_secs + duration_secs)` of `source` into
    /// `out_path`.
    async fn extract(
        &self,
        source: &Path,
        start_secs: f64,
        duration_secs: f64,
        out_path: &Path,
    ) -> Result<ExtractOutcome>;
}

#[async_trait]
impl<T: ChunkExtractor + ?Sized> ChunkExtractor for Arc<T> {
    async fn extract(
        &self,
        source: &Path,
        start_secs: f64,
        duration_secs: f64,
        out_path: &Path,
    ) -> Result<ExtractOutcome> {
        (**self).extract(source, start_secs, duration_secs, out_path).await
    }
}

/// Production extractor shelling out to ffmpeg.
pub struct FfmpegChunkExtractor {
    executor: Arc<dyn CommandExecutor>,
}

impl FfmpegChunkExtractor {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ChunkExtractor for FfmpegChunkExtractor {
    async fn extract(
        &self,
        source: &Path,
        start_secs: f64,
        duration_secs: f64,
        out_path: &Path,
    ) -> Result<ExtractOutcome> {
        let executor = self.executor.clone();
        let source = source.to_path_buf();
        let out = out_path.to_path_buf();

        let output = tokio::task::spawn_blocking(move || {
            let src = source.to_string_lossy();
            let dst = out.to_string_lossy();
            let start = format!("{}", start_secs);
            let duration = format!("{}", duration_secs);
            executor.execute(
                "ffmpeg",
                &[
                    "-hide_banner",
                    "-nostdin",
                    "-y",
                    "-ss",
                    &start,
                    "-t",
                    &duration,
                    "-i",
                    src.as_ref(),
                    "-c",
                    "copy",
                    dst.as_ref(),
                ],
            )
        })
        .await
        .map_err(|e| PolysubError::Extraction {
            message: format!("extraction task panicked: {}", e),
        })??;

        if !output.success {
            if is_end_of_stream(&output.stderr) {
                return Ok(ExtractOutcome::EndOfStream);
            }
            return Err(PolysubError::Extraction {
                message: super::stderr_tail(&output.stderr).to_string(),
            });
        }

        // A start offset at or past the end of the source produces an empty
        // file rather than an error.
        let len = tokio::fs::metadata(out_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if len == 0 {
            let _ = tokio::fs::remove_file(out_path).await;
            return Ok(ExtractOutcome::EndOfStream);
        }

        Ok(ExtractOutcome::Extracted)
    }
}

/// ffmpeg stderr signatures that mean "ran out of data", not "broken input".
fn is_end_of_stream(stderr: &str) -> bool {
    stderr.contains("End of file") || stderr.contains("Invalid data found when processing input")
}

/// One recorded extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractCall {
    pub start_secs: f64,
    pub duration_secs: f64,
    pub out_path: PathBuf,
}

/// Mock extractor for testing.
///
/// Returns scripted outcomes in order; once exhausted, extraction succeeds.
/// Successful extractions write a small placeholder file so downstream reads
/// of the chunk succeed.
#[derive(Debug)]
pub struct MockChunkExtractor {
    outcomes: Mutex<VecDeque<Result<ExtractOutcome>>>,
    calls: Mutex<Vec<ExtractCall>>,
    write_files: bool,
}

impl Default for MockChunkExtractor {
    fn default() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            write_files: true,
        }
    }
}

impl MockChunkExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a specific outcome for the next call.
    pub fn with_outcome(self, outcome: ExtractOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(outcome));
        self
    }

    /// Queue an extraction failure.
    pub fn with_failure(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(PolysubError::Extraction {
                message: message.to_string(),
            }));
        self
    }

    /// Skip writing placeholder chunk files.
    pub fn without_files(mut self) -> Self {
        self.write_files = false;
        self
    }

    /// Get all recorded extraction requests.
    pub fn calls(&self) -> Vec<ExtractCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChunkExtractor for MockChunkExtractor {
    async fn extract(
        &self,
        _source: &Path,
        start_secs: f64,
        duration_secs: f64,
        out_path: &Path,
    ) -> Result<ExtractOutcome> {
        self.calls.lock().unwrap().push(ExtractCall {
            start_secs,
            duration_secs,
            out_path: out_path.to_path_buf(),
        });

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ExtractOutcome::Extracted))?;

        if outcome == ExtractOutcome::Extracted && self.write_files {
            tokio::fs::write(out_path, b"chunk-audio").await?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::executor::MockCommandExecutor;

    #[tokio::test]
    async fn test_ffmpeg_args_and_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chunk_0.webm");
        // Simulate ffmpeg having written the chunk
        std::fs::write(&out, b"data").unwrap();

        let executor = Arc::new(MockCommandExecutor::new().with_output(""));
        let extractor = FfmpegChunkExtractor::new(executor.clone());

        let outcome = extractor
            .extract(Path::new("/tmp/src.webm"), 55.0, 60.0, &out)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::Extracted);

        let (command, args) = executor.call(0).unwrap();
        assert_eq!(command, "ffmpeg");
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "55");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "60");
        assert!(args.contains(&"/tmp/src.webm".to_string()));
        assert_eq!(args.last().unwrap(), out.to_string_lossy().as_ref());
    }

    #[tokio::test]
    async fn test_end_of_file_is_end_of_stream() {
        let executor = Arc::new(
            MockCommandExecutor::new()
                .with_failed_run("av_interleaved_write_frame(): End of file"),
        );
        let extractor = FfmpegChunkExtractor::new(executor);

        let outcome = extractor
            .extract(Path::new("/tmp/src.webm"), 110.0, 60.0, Path::new("/tmp/c.webm"))
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::EndOfStream);
    }

    #[tokio::test]
    async fn test_invalid_trailing_data_is_end_of_stream() {
        let executor = Arc::new(
            MockCommandExecutor::new()
                .with_failed_run("/tmp/src.webm: Invalid data found when processing input"),
        );
        let extractor = FfmpegChunkExtractor::new(executor);

        let outcome = extractor
            .extract(Path::new("/tmp/src.webm"), 165.0, 60.0, Path::new("/tmp/c.webm"))
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::EndOfStream);
    }

    #[tokio::test]
    async fn test_other_ffmpeg_failure_is_error() {
        let executor = Arc::new(
            MockCommandExecutor::new()
                .with_failed_run("Unknown encoder 'opus'\nConversion failed!"),
        );
        let extractor = FfmpegChunkExtractor::new(executor);

        let err = extractor
            .extract(Path::new("/tmp/src.webm"), 0.0, 60.0, Path::new("/tmp/c.webm"))
            .await
            .unwrap_err();
        match err {
            PolysubError::Extraction { message } => {
                assert_eq!(message, "Conversion failed!");
            }
            other => panic!("expected Extraction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_size_output_is_end_of_stream_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chunk_3.webm");
        std::fs::write(&out, b"").unwrap();

        let executor = Arc::new(MockCommandExecutor::new().with_output(""));
        let extractor = FfmpegChunkExtractor::new(executor);

        let outcome = extractor
            .extract(Path::new("/tmp/src.webm"), 165.0, 60.0, &out)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::EndOfStream);
        assert!(!out.exists(), "empty chunk file must be removed");
    }

    #[tokio::test]
    async fn test_missing_output_is_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never_written.webm");

        let executor = Arc::new(MockCommandExecutor::new().with_output(""));
        let extractor = FfmpegChunkExtractor::new(executor);

        let outcome = extractor
            .extract(Path::new("/tmp/src.webm"), 220.0, 60.0, &out)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::EndOfStream);
    }

    #[tokio::test]
    async fn test_mock_extractor_scripted_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockChunkExtractor::new()
            .with_outcome(ExtractOutcome::Extracted)
            .with_outcome(ExtractOutcome::EndOfStream);

        let first = dir.path().join("c0.webm");
        let outcome = mock
            .extract(Path::new("/src"), 0.0, 60.0, &first)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::Extracted);
        assert!(first.exists(), "mock writes placeholder chunk files");

        let outcome = mock
            .extract(Path::new("/src"), 55.0, 60.0, &dir.path().join("c1.webm"))
            .await
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::EndOfStream);

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].start_secs, 0.0);
        assert_eq!(calls[1].start_secs, 55.0);
    }

    #[tokio::test]
    async fn test_mock_extractor_failure() {
        let mock = MockChunkExtractor::new().with_failure("disk full");
        let err = mock
            .extract(Path::new("/src"), 0.0, 60.0, Path::new("/tmp/c.webm"))
            .await
            .unwrap_err();
        assert!(matches!(err, PolysubError::Extraction { .. }));
    }
}
