//! Word-stream to sentence assembly.
//!
//! A steppable accumulator: each word either extends the open sentence or
//! forces a boundary. Boundaries come from speaker changes, terminal
//! punctuation, silence between words, and a duration cap. The cap is
//! enforced *before* an overflowing word is appended, so a sentence built
//! from two or more words never exceeds it; only a single word longer than
//! the cap itself can produce an over-long sentence, because a word cannot
//! be split.

use crate::defaults;
use crate::transcript::{Sentence, WordToken};

/// True when the word closes a sentence by punctuation.
pub fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}

/// Folds one chunk's ordered word stream into sentences.
#[derive(Debug)]
pub struct SentenceAssembler {
    max_sentence_secs: f64,
    max_word_gap_secs: f64,
    open: Option<Sentence>,
    sentences: Vec<Sentence>,
}

impl Default for SentenceAssembler {
    fn default() -> Self {
        Self::new(defaults::MAX_SENTENCE_SECS, defaults::MAX_WORD_GAP_SECS)
    }
}

impl SentenceAssembler {
    pub fn new(max_sentence_secs: f64, max_word_gap_secs: f64) -> Self {
        Self {
            max_sentence_secs,
            max_word_gap_secs,
            open: None,
            sentences: Vec::new(),
        }
    }

    /// Feed the next word, in stream order.
    pub fn push(&mut self, word: &WordToken) {
        let start_new = match &self.open {
            None => true,
            Some(open) => {
                word.speaker_id != open.speaker_id
                    || word.end_secs - open.start_secs > self.max_sentence_secs
            }
        };

        let mut gap_exceeded = false;
        if start_new {
            self.close();
            self.open = Some(Sentence {
                start_secs: word.start_secs,
                end_secs: word.end_secs,
                text: word.text.clone(),
                translated_text: None,
                speaker_id: word.speaker_id,
            });
        } else if let Some(open) = self.open.as_mut() {
            let previous_end = open.end_secs;
            open.end_secs = word.end_secs;
            open.text.push(' ');
            open.text.push_str(&word.text);
            gap_exceeded = word.start_secs - previous_end > self.max_word_gap_secs;
        }

        // Only a lone word longer than the cap can trip this; multi-word
        // growth past the cap was already refused above.
        let over_long = self
            .open
            .as_ref()
            .is_some_and(|open| open.duration_secs() > self.max_sentence_secs);

        if ends_sentence(&word.text) || over_long || gap_exceeded {
            self.close();
        }
    }

    fn close(&mut self) {
        if let Some(done) = self.open.take() {
            self.sentences.push(done);
        }
    }

    /// Flush the trailing open sentence and return everything assembled.
    pub fn finish(mut self) -> Vec<Sentence> {
        self.close();
        self.sentences
    }

    /// Run a whole word stream through the machine.
    pub fn assemble(mut self, words: &[WordToken]) -> Vec<Sentence> {
        for word in words {
            self.push(word);
        }
        self.finish()
    }
}
