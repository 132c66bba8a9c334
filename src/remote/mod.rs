//! REST clients for the recognition, translation and review services.
//!
//! All clients share the same transport posture: a fixed request timeout and
//! a capped redirect policy, built once and cloned per request site. Keys are
//! injected by the composition root; nothing here reads the environment.

pub mod llm;
pub mod speech;
pub mod translate;

pub use llm::{AnthropicChat, ChatModel, MockChatModel};
pub use speech::CloudSpeechRecognizer;
pub use translate::CloudTranslator;

use crate::defaults;
use crate::error::Result;
use std::time::Duration;

/// HTTP client shared by every remote backend.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::limited(
            defaults::HTTP_MAX_REDIRECTS,
        ))
        .build()?)
}
