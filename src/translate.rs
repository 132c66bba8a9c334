//! Sentence translation stage.
//!
//! Runs after the cross-chunk merge, annotating the final sentences with a
//! target-language rendering. Calls are independent, so they are dispatched
//! across a bounded set of tasks and joined by original index; the sentence
//! order never changes regardless of completion order.

use crate::error::{PolysubError, Result};
use crate::transcript::Sentence;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Trait for text translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        (**self).translate(text, target_lang).await
    }
}

/// Bounded-parallel, order-preserving translation over a sentence list.
pub struct TranslationStage {
    translator: Arc<dyn Translator>,
    target_lang: String,
    max_concurrent: usize,
    quiet: bool,
}

impl TranslationStage {
    pub fn new(
        translator: Arc<dyn Translator>,
        target_lang: &str,
        max_concurrent: usize,
        quiet: bool,
    ) -> Self {
        Self {
            translator,
            target_lang: target_lang.to_string(),
            max_concurrent,
            quiet,
        }
    }

    /// Translate every sentence in place. Returns the failure count.
    ///
    /// A failed call leaves that sentence's `translated_text` as `None` and
    /// never affects the rest of the list.
    pub async fn apply(&self, sentences: &mut [Sentence]) -> usize {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        let mut handles = Vec::with_capacity(sentences.len());

        for sentence in sentences.iter() {
            let permit = semaphore.clone().acquire_owned().await;
            let translator = self.translator.clone();
            let text = sentence.text.clone();
            let target = self.target_lang.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                translator.translate(&text, &target).await
            }));
        }

        // join_all keeps submission order, so results line up with indices
        let mut failures = 0;
        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(Ok(translated)) => sentences[index].translated_text = Some(translated),
                Ok(Err(e)) => {
                    failures += 1;
                    if !self.quiet {
                        eprintln!("Translation failed for sentence {}: {}", index, e);
                    }
                }
                Err(e) => {
                    failures += 1;
                    if !self.quiet {
                        eprintln!("Translation task panicked for sentence {}: {}", index, e);
                    }
                }
            }
        }
        failures
    }
}

/// Mock translator for testing.
///
/// Echoes `<lang>:<text>` so results are deterministic under concurrency;
/// texts containing a configured marker fail instead.
#[derive(Debug, Default)]
pub struct MockTranslator {
    fail_markers: Vec<String>,
    calls: Mutex<usize>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any call whose text contains `marker`.
    pub fn with_failure_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        if self.fail_markers.iter().any(|m| text.contains(m)) {
            return Err(PolysubError::Translation {
                message: format!("refused to translate {:?}", text),
            });
        }
        Ok(format!("{}:{}", target_lang, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(text: &str, start: f64) -> Sentence {
        Sentence {
            start_secs: start,
            end_secs: start + 1.0,
            text: text.to_string(),
            translated_text: None,
            speaker_id: 0,
        }
    }

    #[tokio::test]
    async fn test_all_sentences_translated_in_order() {
        let mut sentences: Vec<Sentence> = (0..10)
            .map(|i| sentence(&format!("line {}", i), i as f64))
            .collect();
        let stage = TranslationStage::new(Arc::new(MockTranslator::new()), "ko", 4, true);

        let failures = stage.apply(&mut sentences).await;
        assert_eq!(failures, 0);
        for (i, s) in sentences.iter().enumerate() {
            assert_eq!(
                s.translated_text.as_deref(),
                Some(format!("ko:line {}", i).as_str())
            );
        }
    }

    #[tokio::test]
    async fn test_failure_leaves_sentence_untranslated() {
        let mut sentences = vec![
            sentence("fine", 0.0),
            sentence("poison pill", 1.0),
            sentence("also fine", 2.0),
        ];
        let translator = Arc::new(MockTranslator::new().with_failure_on("poison"));
        let stage = TranslationStage::new(translator.clone(), "ko", 2, true);

        let failures = stage.apply(&mut sentences).await;
        assert_eq!(failures, 1);
        assert_eq!(sentences[0].translated_text.as_deref(), Some("ko:fine"));
        assert!(sentences[1].translated_text.is_none());
        assert_eq!(sentences[2].translated_text.as_deref(), Some("ko:also fine"));
        assert_eq!(translator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_list() {
        let stage = TranslationStage::new(Arc::new(MockTranslator::new()), "ko", 4, true);
        let failures = stage.apply(&mut []).await;
        assert_eq!(failures, 0);
    }

    #[tokio::test]
    async fn test_concurrency_of_one_still_completes() {
        let mut sentences = vec![sentence("a", 0.0), sentence("b", 1.0)];
        let stage = TranslationStage::new(Arc::new(MockTranslator::new()), "en", 1, true);
        let failures = stage.apply(&mut sentences).await;
        assert_eq!(failures, 0);
        assert_eq!(sentences[1].translated_text.as_deref(), Some("en:b"));
    }
}
