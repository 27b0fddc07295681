use std::time::Duration;

use async_trait::async_trait;
use isolang::Language;
use reqwest::Client;
use serde_json::Value;

use super::types::{lang_code, TranslationError, TranslationResult};
use crate::shared::settings::TranslatorSettings;

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0 Safari/537.36";

/// Remote translation call made on a cache miss.
#[async_trait]
pub trait TranslationFetcher: Send + Sync {
    async fn translate(&self, text: &str, source: Language, target: Language) -> TranslationResult<String>;
}

/// Unofficial Google Translate endpoint (free tier, no API key).
pub struct GoogleFreeFetcher {
    http: Client,
    endpoint: String,
}

impl GoogleFreeFetcher {
    pub fn from_settings(settings: &TranslatorSettings) -> TranslationResult<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.as_str());
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    fn request_url(&self, text: &str, source: &str, target: &str) -> String {
        format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.endpoint,
            source,
            target,
            urlencoding::encode(text)
        )
    }

    pub async fn translate_id_to_en(&self, text: &str) -> TranslationResult<String> {
        self.translate(text, Language::Ind, Language::Eng).await
    }

    pub async fn translate_en_to_id(&self, text: &str) -> TranslationResult<String> {
        self.translate(text, Language::Eng, Language::Ind).await
    }
}

/// Joins the text fragments of a `[[["fragment", ...], ...], ...]` response.
/// Returns an empty string when the segment list holds no usable fragment.
pub fn parse_segments(body: &Value) -> TranslationResult<String> {
    let sentences = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslationError::MalformedResponse("expected nested segment array".to_string()))?;

    let mut result = String::new();
    for sentence in sentences {
        if let Some(segment) = sentence.get(0).and_then(|v| v.as_str()) {
            result.push_str(segment);
        }
    }
    Ok(result)
}

#[async_trait]
impl TranslationFetcher for GoogleFreeFetcher {
    async fn translate(&self, text: &str, source: Language, target: Language) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let source_code = lang_code(&source);
        let target_code = lang_code(&target);
        tracing::info!(sl = %source_code, tl = %target_code, chars = text.chars().count(), "fetching translation");

        let url = self.request_url(text, &source_code, &target_code);
        let res = self
            .http
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| TranslationError::Network(e.to_string()))?;
        if !res.status().is_success() {
            return Err(TranslationError::Status(res.status().as_u16()));
        }

        let raw_json: Value = res
            .json()
            .await
            .map_err(|e| TranslationError::MalformedResponse(format!("Failed to parse JSON: {}", e)))?;

        let translated = parse_segments(&raw_json)?;
        if translated.is_empty() {
            // Service answered but produced nothing; keep the original wording.
            return Ok(text.to_string());
        }
        Ok(translated)
    }
}
