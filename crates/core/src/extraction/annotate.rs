//! Annotation capability and the HTTP client for a remote NLP service.

use super::tokens::AnnotatedToken;
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turns text into ordered, entity-annotated tokens.
#[async_trait::async_trait]
pub trait Annotate: Send + Sync {
    async fn annotate(&self, text: &str) -> TriageResult<Vec<AnnotatedToken>>;
}

/// Client for an NLP service speaking a small JSON protocol.
///
/// Request: `POST <url>` with `{"text": "..."}`.
/// Response: `{"tokens": [{"text": "...", "lower": "...", "ent_type": "SYMPTOM"}]}` where
/// `lower` and `ent_type` are optional and an empty `ent_type` means no entity.
pub struct HttpAnnotator {
    url: String,
    client: reqwest::Client,
}

impl HttpAnnotator {
    pub fn new(url: &str, timeout: Duration) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriageError::InvalidConfig(format!("failed to build NLP client: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    tokens: Vec<TokenWire>,
}

#[derive(Deserialize)]
struct TokenWire {
    text: String,
    #[serde(default)]
    lower: Option<String>,
    #[serde(default)]
    ent_type: Option<String>,
}

impl From<TokenWire> for AnnotatedToken {
    fn from(wire: TokenWire) -> Self {
        let mut token = AnnotatedToken::new(wire.text, wire.ent_type);
        if let Some(lower) = wire.lower.filter(|l| !l.is_empty()) {
            token.lower = lower;
        }
        token
    }
}

fn parse_annotation(body: &str) -> TriageResult<Vec<AnnotatedToken>> {
    let de = &mut serde_json::Deserializer::from_str(body);
    let parsed: AnnotateResponse = serde_path_to_error::deserialize(de)
        .map_err(|e| TriageError::Annotation(format!("malformed response: {e}")))?;
    Ok(parsed.tokens.into_iter().map(AnnotatedToken::from).collect())
}

#[async_trait::async_trait]
impl Annotate for HttpAnnotator {
    async fn annotate(&self, text: &str) -> TriageResult<Vec<AnnotatedToken>> {
        let response = self
            .client
            .post(&self.url)
            .json(&AnnotateRequest { text })
            .send()
            .await
            .map_err(|e| TriageError::Annotation(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TriageError::Annotation(e.to_string()))?;
        if !status.is_success() {
            return Err(TriageError::Annotation(format!(
                "service returned status {}",
                status.as_u16()
            )));
        }

        parse_annotation(&body)
    }
}
