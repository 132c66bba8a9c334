//! Cloud speech recognition client.
//!
//! Synchronous recognition with word time offsets, automatic punctuation and
//! speaker diarization enabled. Audio goes up base64-encoded in the request
//! body; word times come back as `"12.300s"` strings and are parsed to
//! fractional seconds here, so the rest of the crate never sees the wire
//! encoding.

use crate::defaults;
use crate::error::{PolysubError, Result};
use crate::transcript::WordToken;
use crate::transcript::recognizer::{SpeechRecognizer, WordGroup};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

pub struct CloudSpeechRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl CloudSpeechRecognizer {
    pub fn new(endpoint: &str, api_key: &str, language: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for CloudSpeechRecognizer {
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<WordGroup>> {
        let body = serde_json::json!({
            "config": {
                "encoding": defaults::AUDIO_ENCODING,
                "sampleRateHertz": defaults::SAMPLE_RATE_HZ,
                "audioChannelCount": defaults::AUDIO_CHANNELS,
                "languageCode": self.language,
                "model": defaults::RECOGNITION_MODEL,
                "enableWordTimeOffsets": true,
                "enableAutomaticPunctuation": true,
                "diarizationConfig": {
                    "enableSpeakerDiarization": true,
                    "minSpeakerCount": defaults::SPEAKER_COUNT,
                    "maxSpeakerCount": defaults::SPEAKER_COUNT,
                },
            },
            "audio": { "content": BASE64.encode(audio) },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(PolysubError::Recognition {
                message: format!("recognize returned {}: {}", status, detail),
            });
        }

        let parsed: RecognizeResponse = response.json().await?;
        parsed.results.into_iter().map(word_group).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    word: String,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "endTime")]
    end_time: String,
    #[serde(rename = "speakerTag", default)]
    speaker_tag: u32,
}

fn word_group(result: RecognitionResult) -> Result<WordGroup> {
    let Some(best) = result.alternatives.into_iter().next() else {
        return Ok(WordGroup::default());
    };
    let words = best
        .words
        .into_iter()
        .map(|w| {
            Ok(WordToken {
                start_secs: parse_wire_secs(&w.start_time)?,
                end_secs: parse_wire_secs(&w.end_time)?,
                text: w.word,
                speaker_id: w.speaker_tag,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(WordGroup { words })
}

/// Parse a protobuf-style duration string such as `"12.300s"`.
fn parse_wire_secs(value: &str) -> Result<f64> {
    value
        .trim_end_matches('s')
        .parse()
        .map_err(|_| PolysubError::Recognition {
            message: format!("unparseable word time {:?}", value),
        })
}
