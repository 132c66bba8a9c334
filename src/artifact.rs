//! Transcription artifact persistence.
//!
//! A run's output is a single pretty-printed JSON file pairing the source
//! reference with the final sentence list, named after the video id and the
//! moment it was written.

use crate::error::Result;
use crate::transcript::Sentence;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Saved output of a transcription run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "sourceReference")]
    pub source_reference: String,
    pub transcription: Vec<Sentence>,
}

impl Artifact {
    pub fn new(source_reference: &str, transcription: Vec<Sentence>) -> Self {
        Self {
            source_reference: source_reference.to_string(),
            transcription,
        }
    }

    /// Artifact filename for `video_id` at `timestamp`.
    ///
    /// RFC 3339 timestamps carry `:` and `.`, which are unsafe or awkward on
    /// common filesystems, so both become `-`.
    pub fn file_name(video_id: &str, timestamp: DateTime<Utc>) -> String {
        let stamp = timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        format!("transcription_{}_{}.json", video_id, stamp)
    }

    /// Write the artifact into `dir`, returning the path written.
    pub fn save(&self, dir: &Path, video_id: &str) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(video_id, Utc::now()));
        std::fs::write(&path, self.to_json()?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
