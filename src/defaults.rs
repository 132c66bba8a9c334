//! Default configuration constants for polysub.
//!
//! Shared by the `Config` section defaults and the `config dump` template.

/// Default chunk duration in seconds.
///
/// Each recognition request covers one chunk. 60 seconds keeps individual
/// requests well under the synchronous recognition limit while amortizing
/// per-request overhead.
pub const CHUNK_SECS: f64 = 60.0;

/// Default overlap between consecutive chunks in seconds.
///
/// Words cut at a chunk boundary reappear intact at the start of the next
/// chunk; the cross-chunk merge removes the duplicates. Must stay below
/// `CHUNK_SECS` or splitting would never advance.
pub const OVERLAP_SECS: f64 = 5.0;

/// Safety cap on chunk count when the source duration is unknown.
pub const MAX_CHUNKS: usize = 15;

/// Maximum sentence duration in seconds during assembly.
///
/// Sentences longer than this are split even without terminal punctuation.
pub const MAX_SENTENCE_SECS: f64 = 10.0;

/// Maximum silence between words, in seconds, before a sentence break.
pub const MAX_WORD_GAP_SECS: f64 = 1.0;

/// Maximum duration of a merged sentence in seconds.
pub const MAX_MERGED_SECS: f64 = 10.0;

/// Maximum gap between sentences, in seconds, for them to merge.
///
/// Overlapping recognition results from consecutive chunks have negative
/// gaps and always satisfy this bound.
pub const MAX_MERGE_GAP_SECS: f64 = 0.5;

/// Default target language for translation.
pub const TARGET_LANGUAGE: &str = "ko";

/// Default recognition language.
pub const RECOGNITION_LANGUAGE: &str = "en-US";

/// Audio sample rate the recognizer is configured for, in Hz.
pub const SAMPLE_RATE_HZ: u32 = 48000;

/// Audio channel count the recognizer is configured for.
pub const AUDIO_CHANNELS: u32 = 2;

/// Audio encoding name sent to the speech API.
pub const AUDIO_ENCODING: &str = "WEBM_OPUS";

/// Recognition model tuned for long-form audio.
pub const RECOGNITION_MODEL: &str = "latest_long";

/// Diarization speaker count hint.
pub const SPEAKER_COUNT: u32 = 1;

/// Maximum concurrent recognition requests in flight.
pub const MAX_CONCURRENT_RECOGNITIONS: usize = 2;

/// Maximum concurrent translation requests in flight.
pub const MAX_CONCURRENT_TRANSLATIONS: usize = 4;

/// HTTP request timeout in seconds for all remote clients.
pub const HTTP_TIMEOUT_SECS: u64 = 50;

/// Maximum redirects followed by the HTTP clients.
pub const HTTP_MAX_REDIRECTS: usize = 2;

/// Total attempts for a caption fetch before giving up.
pub const CAPTION_FETCH_ATTEMPTS: u32 = 2;

/// Delay between caption fetch attempts in milliseconds.
pub const CAPTION_RETRY_DELAY_MS: u64 = 3000;

/// Total attempts for a caption review before giving up.
pub const REVIEW_ATTEMPTS: u32 = 2;

/// Delay between review attempts in milliseconds.
pub const REVIEW_RETRY_DELAY_MS: u64 = 1000;

/// Chat model used for caption review.
pub const REVIEW_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Token budget for a review completion.
pub const REVIEW_MAX_TOKENS: u32 = 8192;

/// Sampling temperature for review completions.
pub const REVIEW_TEMPERATURE: f32 = 0.4;

/// Synchronous recognition endpoint.
pub const SPEECH_ENDPOINT: &str = "https://speech.googleapis.com/v1p1beta1/speech:recognize";

/// Translation v2 endpoint.
pub const TRANSLATE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Messages endpoint for the review chat model.
pub const CHAT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// API version header value for the review chat model.
pub const CHAT_API_VERSION: &str = "2023-06-01";

/// Placeholder video id when none can be parsed from the source reference.
pub const UNKNOWN_VIDEO_ID: &str = "unknown";
