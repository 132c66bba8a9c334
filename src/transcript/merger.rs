//! Cross-chunk sentence stitching.
//!
//! Consumes every chunk's sentences in chunk-index order and re-joins
//! fragments the chunk boundaries created. Sentences recognized twice from
//! an overlap window arrive with a negative gap to the open sentence and
//! fold into it; sentences split mid-thought at a boundary arrive with a
//! small positive gap and are joined back together. Merging never crosses a
//! speaker change and never grows a sentence past the merged-duration cap.

use crate::defaults;
use crate::transcript::Sentence;

/// Accumulator over the chunk-ordered sentence stream.
#[derive(Debug)]
pub struct CrossChunkMerger {
    max_merged_secs: f64,
    max_gap_secs: f64,
    open: Option<Sentence>,
    merged: Vec<Sentence>,
}

impl Default for CrossChunkMerger {
    fn default() -> Self {
        Self::new(defaults::MAX_MERGED_SECS, defaults::MAX_MERGE_GAP_SECS)
    }
}

impl CrossChunkMerger {
    pub fn new(max_merged_secs: f64, max_gap_secs: f64) -> Self {
        Self {
            max_merged_secs,
            max_gap_secs,
            open: None,
            merged: Vec::new(),
        }
    }

    /// Feed the next sentence, in chunk order.
    pub fn push(&mut self, candidate: Sentence) {
        let mergeable = self.open.as_ref().is_some_and(|open| {
            candidate.speaker_id == open.speaker_id
                && candidate.end_secs - open.start_secs <= self.max_merged_secs
                && candidate.start_secs - open.end_secs <= self.max_gap_secs
        });

        if mergeable && let Some(open) = self.open.as_mut() {
            // Overlap duplicates can end before the open sentence does
            open.end_secs = open.end_secs.max(candidate.end_secs);
            open.text.push(' ');
            open.text.push_str(&candidate.text);
        } else {
            let done = self.open.replace(candidate);
            self.merged.extend(done);
        }
    }

    /// Flush the trailing open sentence and return the final sequence.
    pub fn finish(mut self) -> Vec<Sentence> {
        self.merged.extend(self.open.take());
        self.merged
    }

    /// Merge a whole chunk-ordered sentence sequence.
    pub fn merge(mut self, sentences: impl IntoIterator<Item = Sentence>) -> Vec<Sentence> {
        for sentence in sentences {
            self.push(sentence);
        }
        self.finish()
    }
}
