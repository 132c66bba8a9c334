//! Chat-model review of fetched captions.
//!
//! Sends the whole caption list to a chat model in one request and expects a
//! strict JSON reply carrying corrected text, unchanged timing, and a
//! translation per caption. Model output is untrusted: anything that does not
//! parse against the exact schema counts as a failed attempt.

use crate::captions::Caption;
use crate::defaults;
use crate::error::{PolysubError, Result};
use crate::remote::ChatModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One caption after review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewedCaption {
    pub text: String,
    pub duration: f64,
    pub offset: f64,
    pub translated: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReviewReply {
    data: Vec<ReviewedCaption>,
}

/// Runs caption lists through a chat model for correction and translation.
pub struct CaptionReviewer {
    chat: Arc<dyn ChatModel>,
    target_lang: String,
    retry_delay: Duration,
}

impl CaptionReviewer {
    pub fn new(chat: Arc<dyn ChatModel>, target_lang: &str) -> Self {
        Self {
            chat,
            target_lang: target_lang.to_string(),
            retry_delay: Duration::from_millis(defaults::REVIEW_RETRY_DELAY_MS),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a subtitle editor. Correct recognition errors in the \
             captions you are given, keep every offset and duration exactly as \
             they are, and translate each caption into {}. Reply with nothing \
             but JSON of the form {{\"data\":[{{\"text\":string,\
             \"duration\":number,\"offset\":number,\"translated\":string}}]}} \
             with one entry per input caption.",
            self.target_lang
        )
    }

    /// Review `captions`, retrying on model or parse failures.
    pub async fn review(&self, captions: &[Caption]) -> Result<Vec<ReviewedCaption>> {
        let payload = serde_json::to_string(captions)?;
        let mut last_err = None;
        for attempt in 1..=defaults::REVIEW_ATTEMPTS {
            match self.chat.complete(&self.system_prompt(), &payload).await {
                Ok(reply) => match parse_reply(&reply) {
                    Ok(reviewed) => return Ok(reviewed),
                    Err(e) => last_err = Some(e),
                },
                Err(e) => last_err = Some(e),
            }
            if attempt < defaults::REVIEW_ATTEMPTS {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        Err(last_err.unwrap_or_else(|| PolysubError::Review {
            message: "no review attempts made".to_string(),
        }))
    }
}

fn parse_reply(reply: &str) -> Result<Vec<ReviewedCaption>> {
    let parsed: ReviewReply =
        serde_json::from_str(reply.trim()).map_err(|e| PolysubError::Review {
            message: format!("review output did not match the schema: {}", e),
        })?;
    Ok(parsed.data)
}
