//! Error types for polysub.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolysubError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Missing credential {key}: set it in the config file or environment")]
    MissingCredential { key: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Subprocess errors
    #[error("Command not found: {tool}")]
    CommandNotFound { tool: String },

    #[error("Command {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    // Media errors
    #[error("Audio extraction failed: {message}")]
    Extraction { message: String },

    #[error("Duration probe failed: {message}")]
    DurationProbe { message: String },

    #[error("Processing of chunk {index} failed: {message}")]
    ChunkProcessing { index: usize, message: String },

    // Pipeline stage errors
    #[error("Speech recognition failed: {message}")]
    Recognition { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    // Caption path errors
    #[error("Caption fetch failed: {message}")]
    CaptionFetch { message: String },

    #[error("Caption review failed: {message}")]
    Review { message: String },

    // General I/O and wire errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Fallback for anything the variants above do not cover
    #[error("{0}")]
    Other(String),
}

// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PolysubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = PolysubError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = PolysubError::ConfigInvalidValue {
            key: "audio.overlap_secs".to_string(),
            message: "must be less than chunk_secs".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for audio.overlap_secs: must be less than chunk_secs"
        );
    }

    #[test]
    fn test_missing_credential_display() {
        let error = PolysubError::MissingCredential {
            key: "recognizer.api_key".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Missing credential recognizer.api_key: set it in the config file or environment"
        );
    }

    #[test]
    fn test_command_not_found_display() {
        let error = PolysubError::CommandNotFound {
            tool: "ffmpeg".to_string(),
        };
        assert_eq!(error.to_string(), "Command not found: ffmpeg");
    }

    #[test]
    fn test_command_failed_display() {
        let error = PolysubError::CommandFailed {
            command: "yt-dlp".to_string(),
            message: "exit status 1".to_string(),
        };
        assert_eq!(error.to_string(), "Command yt-dlp failed: exit status 1");
    }

    #[test]
    fn test_extraction_display() {
        let error = PolysubError::Extraction {
            message: "unsupported container".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Audio extraction failed: unsupported container"
        );
    }

    #[test]
    fn test_duration_probe_display() {
        let error = PolysubError::DurationProbe {
            message: "ffprobe produced no duration".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Duration probe failed: ffprobe produced no duration"
        );
    }

    #[test]
    fn test_chunk_processing_display() {
        let error = PolysubError::ChunkProcessing {
            index: 3,
            message: "write failed".to_string(),
        };
        assert_eq!(error.to_string(), "Processing of chunk 3 failed: write failed");
    }

    #[test]
    fn test_recognition_display() {
        let error = PolysubError::Recognition {
            message: "quota exceeded".to_string(),
        };
        assert_eq!(error.to_string(), "Speech recognition failed: quota exceeded");
    }

    #[test]
    fn test_translation_display() {
        let error = PolysubError::Translation {
            message: "invalid target language".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Translation failed: invalid target language"
        );
    }

    #[test]
    fn test_caption_fetch_display() {
        let error = PolysubError::CaptionFetch {
            message: "no caption track".to_string(),
        };
        assert_eq!(error.to_string(), "Caption fetch failed: no caption track");
    }

    #[test]
    fn test_review_display() {
        let error = PolysubError::Review {
            message: "model returned no usable output".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Caption review failed: model returned no usable output"
        );
    }

    #[test]
    fn test_other_display() {
        let error = PolysubError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: PolysubError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("chunk_secs =").unwrap_err();
        let error: PolysubError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: PolysubError = json_error.into();
        assert!(error.to_string().contains("JSON error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn succeeds() -> Result<usize> {
            Ok(7)
        }
        fn fails() -> Result<usize> {
            Err(PolysubError::Other("test error".to_string()))
        }
        assert_eq!(succeeds().unwrap(), 7);
        assert!(fails().is_err());
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: PolysubError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_source_chain_toml() {
        let toml_error = toml::from_str::<toml::Value>("dir = \"unclosed").unwrap_err();
        let error: PolysubError = toml_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<PolysubError>();
        assert_sync::<PolysubError>();
    }

    #[test]
    fn test_error_debug_format() {
        let error = PolysubError::ConfigFileNotFound {
            path: "/test/path".to_string(),
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("ConfigFileNotFound"));
        assert!(debug_str.contains("/test/path"));
    }
}
