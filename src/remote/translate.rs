//! Cloud translation client (v2 text API).

use crate::error::{PolysubError, Result};
use crate::translate::Translator;
use async_trait::async_trait;
use serde::Deserialize;

pub struct CloudTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CloudTranslator {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl Translator for CloudTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let body = serde_json::json!({
            "q": text,
            "target": target_lang,
            "format": "text",
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
            return Err(PolysubError::Translation {
                message: format!("translate returned {}: {}", status, detail),
            });
        }

        let parsed: TranslateResponse = response.json().await?;
        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| PolysubError::Translation {
                message: "empty translation response".to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}
