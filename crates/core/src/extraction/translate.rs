//! Translation capability and its implementations.

use crate::constants::MAX_TRANSLATE_CHARS;
use crate::{TriageError, TriageResult};
use std::time::Duration;

/// Converts text into a target language, detecting the source language itself.
#[async_trait::async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> TriageResult<String>;
}

/// Returns text unchanged. Used when translation is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughTranslator;

#[async_trait::async_trait]
impl Translate for PassthroughTranslator {
    async fn translate(&self, text: &str, _target: &str) -> TriageResult<String> {
        Ok(text.to_string())
    }
}

/// Client for Google's public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    url: String,
    client: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(url: &str, timeout: Duration) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TriageError::InvalidConfig(format!("failed to build translation client: {e}"))
            })?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The response is a nested array whose first element lists `[translated, original, ...]`
/// segments, one per sentence.
fn parse_translation(body: &serde_json::Value) -> TriageResult<String> {
    let segments = body
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TriageError::Translation("response has no translated segments".into()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(|p| p.as_str()) {
            translated.push_str(part);
        }
    }

    if translated.trim().is_empty() {
        return Err(TriageError::Translation("response translated to nothing".into()));
    }
    Ok(translated)
}

#[async_trait::async_trait]
impl Translate for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> TriageResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let length = text.chars().count();
        if length > MAX_TRANSLATE_CHARS {
            return Err(TriageError::Translation(format!(
                "text has {length} characters, limit is {MAX_TRANSLATE_CHARS}"
            )));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TriageError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::Translation(format!(
                "backend returned status {}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TriageError::Translation(format!("malformed response: {e}")))?;
        parse_translation(&body)
    }
}
