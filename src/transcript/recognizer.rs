//! Speech recognition capability seam.

use crate::error::{PolysubError, Result};
use crate::transcript::WordToken;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One recognizer result group: an ordered, chunk-relative word list.
///
/// Recognizers that refine results incrementally return several groups for
/// a single request; the last group is the most complete one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordGroup {
    pub words: Vec<WordToken>,
}

/// Trait for word-level speech recognition backends.
///
/// Implementations receive one chunk's encoded audio and return word groups
/// whose times are relative to the start of that audio.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<WordGroup>>;
}

#[async_trait]
impl<T: SpeechRecognizer + ?Sized> SpeechRecognizer for Arc<T> {
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<WordGroup>> {
        (**self).recognize(audio).await
    }
}

/// Mock recognizer for testing.
///
/// Returns scripted results in call order; once the script is exhausted,
/// further calls recognize nothing.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    results: Mutex<VecDeque<Result<Vec<WordGroup>>>>,
    audio_sizes: Mutex<Vec<usize>>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single-group result for the next call.
    pub fn with_words(self, words: Vec<WordToken>) -> Self {
        self.results
            .lock()
            .unwrap()
            .push_back(Ok(vec![WordGroup { words }]));
        self
    }

    /// Queue a multi-group result for the next call.
    pub fn with_groups(self, groups: Vec<WordGroup>) -> Self {
        self.results.lock().unwrap().push_back(Ok(groups));
        self
    }

    /// Queue a recognition failure.
    pub fn with_error(self, message: &str) -> Self {
        self.results
            .lock()
            .unwrap()
            .push_back(Err(PolysubError::Recognition {
                message: message.to_string(),
            }));
        self
    }

    pub fn call_count(&self) -> usize {
        self.audio_sizes.lock().unwrap().len()
    }

    /// Byte size of the audio passed to each call, in call order.
    pub fn audio_sizes(&self) -> Vec<usize> {
        self.audio_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<WordGroup>> {
        self.audio_sizes.lock().unwrap().push(audio.len());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
