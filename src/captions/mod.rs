//! Pre-existing caption retrieval.
//!
//! The alternate entry path: instead of transcribing audio, pull the caption
//! track a video already has. The watch page embeds the track URL in a JSON
//! blob (`"captionTracks":[{"baseUrl":...}]`, ampersands escaped as
//! `\u0026`); the track itself is timedtext XML with entity-encoded bodies.
//! Both fetches retry a bounded number of times with a fixed delay.

pub mod review;

pub use review::{CaptionReviewer, ReviewedCaption};

use crate::defaults;
use crate::error::{PolysubError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    #[serde(rename = "offset")]
    pub offset_secs: f64,
    #[serde(rename = "duration")]
    pub duration_secs: f64,
}

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Caption>>;
}

#[async_trait]
impl<T: CaptionSource + ?Sized> CaptionSource for Arc<T> {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Caption>> {
        (**self).fetch(video_id).await
    }
}

/// Caption source scraping the public watch page.
pub struct YoutubeCaptionSource {
    client: reqwest::Client,
    watch_base: String,
    retry_delay: Duration,
}

impl YoutubeCaptionSource {
    pub fn new() -> Result<Self> {
        Self::with_base("https://www.youtube.com")
    }

    pub fn with_base(watch_base: &str) -> Result<Self> {
        Ok(Self {
            client: crate::remote::http_client()?,
            watch_base: watch_base.trim_end_matches('/').to_string(),
            retry_delay: Duration::from_millis(defaults::CAPTION_RETRY_DELAY_MS),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_once(&self, video_id: &str) -> Result<Vec<Caption>> {
        let watch_url = format!("{}/watch?v={}", self.watch_base, video_id);
        let response = self.client.get(&watch_url).send().await?;
        if !response.status().is_success() {
            return Err(PolysubError::CaptionFetch {
                message: format!("watch page returned {}", response.status()),
            });
        }
        let page = response.text().await?;

        let track_url = caption_track_url(&page).ok_or_else(|| PolysubError::CaptionFetch {
            message: "no caption track on watch page".to_string(),
        })?;

        let response = self.client.get(&track_url).send().await?;
        if !response.status().is_success() {
            return Err(PolysubError::CaptionFetch {
                message: format!("caption track returned {}", response.status()),
            });
        }
        let xml = response.text().await?;

        let captions = parse_timedtext(&xml);
        if captions.is_empty() {
            return Err(PolysubError::CaptionFetch {
                message: "caption track is empty".to_string(),
            });
        }
        Ok(captions)
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptionSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Caption>> {
        let mut last_err = None;
        for attempt in 1..=defaults::CAPTION_FETCH_ATTEMPTS {
            match self.fetch_once(video_id).await {
                Ok(captions) => return Ok(captions),
                Err(e) => last_err = Some(e),
            }
            if attempt < defaults::CAPTION_FETCH_ATTEMPTS {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        Err(last_err.unwrap_or_else(|| PolysubError::CaptionFetch {
            message: "no fetch attempts made".to_string(),
        }))
    }
}

/// First caption track URL embedded in the watch page, unescaped.
fn caption_track_url(page: &str) -> Option<String> {
    let tracks = &page[page.find("\"captionTracks\":")?..];
    let marker = "\"baseUrl\":\"";
    let after = &tracks[tracks.find(marker)? + marker.len()..];
    let end = after.find('"')?;
    Some(after[..end].replace("\\u0026", "&"))
}

/// Parse a timedtext track: `<text start="1.3" dur="2.4">body</text>` cues.
fn parse_timedtext(xml: &str) -> Vec<Caption> {
    let mut captions = Vec::new();
    let mut rest = xml;
    while let Some(open_at) = rest.find("<text ") {
        rest = &rest[open_at..];
        let Some(tag_end) = rest.find('>') else { break };
        let attrs = &rest[..tag_end];
        let after_tag = &rest[tag_end + 1..];
        let Some(close_at) = after_tag.find("</text>") else {
            break;
        };

        if let Some(start) = attr_value(attrs, "start").and_then(|v| v.parse().ok())
            && let Some(dur) = attr_value(attrs, "dur").and_then(|v| v.parse().ok())
        {
            captions.push(Caption {
                text: decode_entities(&after_tag[..close_at]),
                offset_secs: start,
                duration_secs: dur,
            });
        }
        rest = &after_tag[close_at + "</text>".len()..];
    }
    captions
}

fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!("{}=\"", name);
    let after = &attrs[attrs.find(&marker)? + marker.len()..];
    let end = after.find('"')?;
    Some(&after[..end])
}

/// Decode the handful of entities timedtext actually emits.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        match &tail[..=semi] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" | "&#39;" => out.push('\''),
            other => out.push_str(other),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}

/// Mock caption source for testing.
///
/// Returns scripted results in call order; exhausted calls fetch nothing.
#[derive(Debug, Default)]
pub struct MockCaptionSource {
    results: Mutex<VecDeque<Result<Vec<Caption>>>>,
    requests: Mutex<Vec<String>>,
}

impl MockCaptionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_captions(self, captions: Vec<Caption>) -> Self {
        self.results.lock().unwrap().push_back(Ok(captions));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.results
            .lock()
            .unwrap()
            .push_back(Err(PolysubError::CaptionFetch {
                message: message.to_string(),
            }));
        self
    }

    /// Video ids requested, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptionSource for MockCaptionSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Caption>> {
        self.requests.lock().unwrap().push(video_id.to_string());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
