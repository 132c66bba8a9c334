use crate::defaults;
use crate::error::{PolysubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub recognizer: RecognizerConfig,
    pub translate: TranslateConfig,
    pub review: ReviewConfig,
    pub output: OutputConfig,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub chunk_secs: f64,
    pub overlap_secs: f64,
    pub max_chunks: usize,
    /// Working directory for downloaded audio and chunk files.
    /// Defaults to the system temp directory when unset.
    pub work_dir: Option<PathBuf>,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerConfig {
    pub api_key: Option<String>,
    pub language: String,
    pub endpoint: String,
    pub max_concurrent: usize,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub target_language: String,
    pub endpoint: String,
    pub max_concurrent: usize,
}

/// Caption review configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub endpoint: String,
}

/// Artifact output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            chunk_secs: defaults::CHUNK_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            max_chunks: defaults::MAX_CHUNKS,
            work_dir: None,
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: defaults::RECOGNITION_LANGUAGE.to_string(),
            endpoint: defaults::SPEECH_ENDPOINT.to_string(),
            max_concurrent: defaults::MAX_CONCURRENT_RECOGNITIONS,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            endpoint: defaults::TRANSLATE_ENDPOINT.to_string(),
            max_concurrent: defaults::MAX_CONCURRENT_TRANSLATIONS,
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: defaults::REVIEW_MODEL.to_string(),
            max_tokens: defaults::REVIEW_MAX_TOKENS,
            temperature: defaults::REVIEW_TEMPERATURE,
            endpoint: defaults::CHAT_ENDPOINT.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - POLYSUB_SPEECH_API_KEY → recognizer.api_key
    /// - POLYSUB_TRANSLATE_API_KEY → translate.api_key
    /// - POLYSUB_ANTHROPIC_API_KEY → review.api_key
    /// - POLYSUB_TARGET_LANGUAGE → translate.target_language
    /// - POLYSUB_OUTPUT_DIR → output.dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("POLYSUB_SPEECH_API_KEY")
            && !key.is_empty()
        {
            self.recognizer.api_key = Some(key);
        }

        if let Ok(key) = std::env::var("POLYSUB_TRANSLATE_API_KEY")
            && !key.is_empty()
        {
            self.translate.api_key = Some(key);
        }

        if let Ok(key) = std::env::var("POLYSUB_ANTHROPIC_API_KEY")
            && !key.is_empty()
        {
            self.review.api_key = Some(key);
        }

        if let Ok(lang) = std::env::var("POLYSUB_TARGET_LANGUAGE")
            && !lang.is_empty()
        {
            self.translate.target_language = lang;
        }

        if let Ok(dir) = std::env::var("POLYSUB_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output.dir = PathBuf::from(dir);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/polysub/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("polysub")
            .join("config.toml")
    }

    /// Validate structural invariants.
    ///
    /// Credential presence is checked separately per stage, so a config
    /// without keys still validates for the caption-only path.
    pub fn validate(&self) -> Result<()> {
        if !(self.audio.chunk_secs > 0.0) {
            return Err(PolysubError::ConfigInvalidValue {
                key: "audio.chunk_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.overlap_secs < 0.0 {
            return Err(PolysubError::ConfigInvalidValue {
                key: "audio.overlap_secs".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        // Equal values would make the split start offset stand still.
        if self.audio.overlap_secs >= self.audio.chunk_secs {
            return Err(PolysubError::ConfigInvalidValue {
                key: "audio.overlap_secs".to_string(),
                message: "must be less than chunk_secs".to_string(),
            });
        }
        if self.audio.max_chunks == 0 {
            return Err(PolysubError::ConfigInvalidValue {
                key: "audio.max_chunks".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.recognizer.max_concurrent == 0 {
            return Err(PolysubError::ConfigInvalidValue {
                key: "recognizer.max_concurrent".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.translate.max_concurrent == 0 {
            return Err(PolysubError::ConfigInvalidValue {
                key: "translate.max_concurrent".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Recognition API key, or a MissingCredential error.
    pub fn recognizer_key(&self) -> Result<&str> {
        self.recognizer
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PolysubError::MissingCredential {
                key: "recognizer.api_key".to_string(),
            })
    }

    /// Translation API key, or a MissingCredential error.
    pub fn translate_key(&self) -> Result<&str> {
        self.translate
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PolysubError::MissingCredential {
                key: "translate.api_key".to_string(),
            })
    }

    /// Review API key, or a MissingCredential error.
    pub fn review_key(&self) -> Result<&str> {
        self.review
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PolysubError::MissingCredential {
                key: "review.api_key".to_string(),
            })
    }

    /// Resolve the working directory for downloaded and chunked audio.
    pub fn work_dir(&self) -> PathBuf {
        self.audio
            .work_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Get a configuration value by dotted key path (e.g., "audio.chunk_secs").
    pub fn get_value_by_path(&self, path: &str) -> Result<String> {
        let root = self.as_toml_value()?;
        let mut current = &root;
        for segment in path.split('.') {
            current = current
                .get(segment)
                .ok_or_else(|| PolysubError::ConfigInvalidValue {
                    key: path.to_string(),
                    message: "unknown configuration key".to_string(),
                })?;
        }
        Ok(render_toml_value(current))
    }

    /// Set a configuration value by dotted key path and persist the file.
    ///
    /// The updated document is type-checked by deserializing it back into
    /// `Config` before anything is written.
    pub fn set_value_by_path(config_path: &Path, key: &str, value: &str) -> Result<()> {
        let mut root: toml::Value = if config_path.exists() {
            toml::from_str(&fs::read_to_string(config_path)?)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let segments: Vec<&str> = key.split('.').collect();
        let (leaf, tables) = segments
            .split_last()
            .ok_or_else(|| PolysubError::ConfigInvalidValue {
                key: key.to_string(),
                message: "empty key".to_string(),
            })?;

        let mut current = &mut root;
        for segment in tables {
            let table =
                current
                    .as_table_mut()
                    .ok_or_else(|| PolysubError::ConfigInvalidValue {
                        key: key.to_string(),
                        message: format!("'{}' is not a table", segment),
                    })?;
            current = table
                .entry(segment.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }
        let table = current
            .as_table_mut()
            .ok_or_else(|| PolysubError::ConfigInvalidValue {
                key: key.to_string(),
                message: "parent is not a table".to_string(),
            })?;
        table.insert(leaf.to_string(), parse_toml_scalar(value));

        let serialized =
            toml::to_string_pretty(&root).map_err(|e| PolysubError::ConfigInvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        let config: Config = toml::from_str(&serialized)?;
        config.validate()?;

        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, serialized)?;
        Ok(())
    }

    /// Render the full configuration as TOML.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PolysubError::Other(e.to_string()))
    }

    /// Render a single configuration section as TOML.
    pub fn display_section(&self, section: &str) -> Result<String> {
        let root = self.as_toml_value()?;
        let value = root
            .get(section)
            .ok_or_else(|| PolysubError::ConfigInvalidValue {
                key: section.to_string(),
                message: "unknown configuration section".to_string(),
            })?;
        toml::to_string_pretty(value).map_err(|e| PolysubError::Other(e.to_string()))
    }

    /// Produce a commented configuration template for `config dump`.
    pub fn dump_template() -> String {
        format!(
            r#"# polysub configuration
# Place at ~/.config/polysub/config.toml (or pass --config PATH).
# API keys can also come from the environment:
#   POLYSUB_SPEECH_API_KEY, POLYSUB_TRANSLATE_API_KEY, POLYSUB_ANTHROPIC_API_KEY

[audio]
# Duration of each recognition chunk in seconds.
chunk_secs = {chunk}
# Overlap between consecutive chunks in seconds (must be < chunk_secs).
overlap_secs = {overlap}
# Safety cap on chunk count when the source duration is unknown.
max_chunks = {max_chunks}
# Working directory for intermediate audio files (default: system temp dir).
# work_dir = "/tmp/polysub"

[recognizer]
# api_key = "..."
language = "{language}"
max_concurrent = {rec_concurrent}

[translate]
enabled = true
# api_key = "..."
target_language = "{target}"
max_concurrent = {tr_concurrent}

[review]
# api_key = "..."
model = "{model}"
max_tokens = {max_tokens}
temperature = {temperature}

[output]
# Directory for transcription artifacts.
dir = "."
"#,
            chunk = defaults::CHUNK_SECS,
            overlap = defaults::OVERLAP_SECS,
            max_chunks = defaults::MAX_CHUNKS,
            language = defaults::RECOGNITION_LANGUAGE,
            rec_concurrent = defaults::MAX_CONCURRENT_RECOGNITIONS,
            target = defaults::TARGET_LANGUAGE,
            tr_concurrent = defaults::MAX_CONCURRENT_TRANSLATIONS,
            model = defaults::REVIEW_MODEL,
            max_tokens = defaults::REVIEW_MAX_TOKENS,
            temperature = defaults::REVIEW_TEMPERATURE,
        )
    }

    fn as_toml_value(&self) -> Result<toml::Value> {
        let serialized =
            toml::to_string(self).map_err(|e| PolysubError::Other(e.to_string()))?;
        Ok(toml::from_str(&serialized)?)
    }
}

/// Parse a CLI-provided scalar into the closest TOML type.
fn parse_toml_scalar(value: &str) -> toml::Value {
    if let Ok(b) = value.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = value.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(value.to_string())
}

/// Render a TOML value for `config get` (strings unquoted).
fn render_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
