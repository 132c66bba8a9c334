//! Source duration probing via ffprobe.

use crate::error::{PolysubError, Result};
use crate::media::executor::CommandExecutor;
use std::path::Path;
use std::sync::Arc;

/// Probe the duration of a media file in seconds.
///
/// A failed probe is not fatal: live streams and still-growing downloads have
/// no trustworthy duration, and the caller falls back to splitting until end
/// of stream is reached.
pub async fn probe_duration(executor: Arc<dyn CommandExecutor>, source: &Path) -> Result<f64> {
    let source = source.to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        let src = source.to_string_lossy();
        executor.execute(
            "ffprobe",
            &[
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                src.as_ref(),
            ],
        )
    })
    .await
    .map_err(|e| PolysubError::DurationProbe {
        message: format!("probe task panicked: {}", e),
    })??;

    if !output.success {
        return Err(PolysubError::DurationProbe {
            message: first_line(&output.stderr),
        });
    }

    let secs: f64 = output.stdout.trim().parse().map_err(|_| {
        PolysubError::DurationProbe {
            message: format!("ffprobe produced no duration: {:?}", output.stdout.trim()),
        }
    })?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(PolysubError::DurationProbe {
            message: format!("implausible duration {}", secs),
        });
    }

    Ok(secs)
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
