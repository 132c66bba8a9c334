//! Media plumbing: subprocess execution, download, probing, and chunk extraction.
//!
//! Everything here shells out to external tools (`yt-dlp`, `ffprobe`, `ffmpeg`)
//! through the `CommandExecutor` seam so the callers stay testable without the
//! tools installed.

pub mod download;
pub mod executor;
pub mod extract;
pub mod probe;

pub use download::{extract_video_id, fetch_audio};
pub use executor::{CommandExecutor, CommandOutput, MockCommandExecutor, SystemCommandExecutor};
pub use extract::{ChunkExtractor, ExtractOutcome, FfmpegChunkExtractor, MockChunkExtractor};
pub use probe::probe_duration;

/// Last non-empty stderr line, where command-line tools put the actual error.
pub(crate) fn stderr_tail(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no diagnostics")
}
