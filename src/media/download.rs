//! Source acquisition.
//!
//! A transcription source is either a file already on disk or a URL. Local
//! paths pass through untouched; URLs are handed to yt-dlp, which downloads
//! the best audio-only stream and prints the final file path on stdout.

use crate::error::{PolysubError, Result};
use crate::media::executor::CommandExecutor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pull the 11-character video id out of a YouTube URL.
///
/// Recognizes watch URLs (`v=` query parameter), `youtu.be/` short links and
/// `/shorts/` paths. Returns `None` for anything else, including local paths.
pub fn extract_video_id(source: &str) -> Option<String> {
    let tail = if let Some((_, rest)) = source.split_once("v=") {
        rest
    } else if let Some((_, rest)) = source.split_once("youtu.be/") {
        rest
    } else if let Some((_, rest)) = source.split_once("/shorts/") {
        rest
    } else {
        return None;
    };

    let id: String = tail
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.len() == 11 { Some(id) } else { None }
}

/// Resolve `source` to a local audio file.
///
/// An existing path is returned as-is. Anything else is treated as a URL and
/// downloaded into `work_dir`.
pub async fn fetch_audio(
    executor: Arc<dyn CommandExecutor>,
    source: &str,
    work_dir: &Path,
) -> Result<PathBuf> {
    let local = Path::new(source);
    if local.exists() {
        return Ok(local.to_path_buf());
    }

    let url = source.to_string();
    let template = work_dir.join("source.%(ext)s");

    let output = tokio::task::spawn_blocking(move || {
        let tmpl = template.to_string_lossy();
        // --print implies --simulate, so --no-simulate keeps the download.
        executor.execute(
            "yt-dlp",
            &[
                "-f",
                "bestaudio",
                "--no-playlist",
                "--quiet",
                "--no-simulate",
                "--print",
                "after_move:filepath",
                "-o",
                tmpl.as_ref(),
                &url,
            ],
        )
    })
    .await
    .map_err(|e| PolysubError::Extraction {
        message: format!("download task panicked: {}", e),
    })??;

    if !output.success {
        return Err(PolysubError::Extraction {
            message: format!("audio download failed: {}", super::stderr_tail(&output.stderr)),
        });
    }

    let downloaded = output.stdout.trim();
    if downloaded.is_empty() {
        return Err(PolysubError::Extraction {
            message: "yt-dlp reported no output file".to_string(),
        });
    }
    Ok(PathBuf::from(downloaded))
}
