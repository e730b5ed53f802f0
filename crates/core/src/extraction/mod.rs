//! Symptom extraction pipeline.
//!
//! `extract` runs three steps:
//! 1. translate the text into the canonical language, falling back to the text as typed when
//!    the translator fails or exceeds its time budget,
//! 2. annotate the text into tokens (a failure here fails the request),
//! 3. keep the entity-tagged tokens, or when there are none, every token that is not a stopword.

pub mod annotate;
pub mod lexicon;
pub mod stopwords;
pub mod tokens;
pub mod translate;

use crate::constants::SYMPTOM_ENTITY_LABELS;
use crate::{CoreConfig, TriageError, TriageResult};
use annotate::{Annotate, HttpAnnotator};
use lexicon::{Lexicon, LexiconAnnotator};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use stopwords::Stopwords;
use tokens::{AnnotatedToken, RawText};
use translate::{GoogleTranslator, PassthroughTranslator, Translate};

/// Selects the symptom tokens out of an annotated token stream.
#[derive(Clone, Debug)]
pub struct TokenFilter {
    entity_labels: HashSet<String>,
    stopwords: Stopwords,
}

impl TokenFilter {
    pub fn new<I, S>(entity_labels: I, stopwords: Stopwords) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_labels: entity_labels.into_iter().map(Into::into).collect(),
            stopwords,
        }
    }

    /// Entity-tagged tokens when any exist, otherwise the non-stopword tokens. Order is kept.
    pub fn select(&self, tokens: &[AnnotatedToken]) -> Vec<String> {
        let symptoms: Vec<String> = tokens
            .iter()
            .filter(|t| {
                t.entity
                    .as_deref()
                    .is_some_and(|label| self.entity_labels.contains(label))
            })
            .map(|t| t.text.clone())
            .collect();
        if !symptoms.is_empty() {
            return symptoms;
        }

        tokens
            .iter()
            .filter(|t| !self.stopwords.contains(&t.lower))
            .map(|t| t.text.clone())
            .collect()
    }
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self::new(SYMPTOM_ENTITY_LABELS, Stopwords::english())
    }
}

/// The extraction pipeline with its collaborators. Shared read-only across requests.
pub struct SymptomExtractor {
    translator: Arc<dyn Translate>,
    annotator: Arc<dyn Annotate>,
    filter: TokenFilter,
    canonical_language: String,
    translate_timeout: Duration,
    annotate_timeout: Duration,
}

impl SymptomExtractor {
    pub fn new(
        translator: Arc<dyn Translate>,
        annotator: Arc<dyn Annotate>,
        filter: TokenFilter,
        canonical_language: impl Into<String>,
        translate_timeout: Duration,
        annotate_timeout: Duration,
    ) -> Self {
        Self {
            translator,
            annotator,
            filter,
            canonical_language: canonical_language.into(),
            translate_timeout,
            annotate_timeout,
        }
    }

    /// Build the extractor the configuration describes.
    ///
    /// Translation goes through [`GoogleTranslator`] unless it is switched off; annotation uses
    /// a remote [`HttpAnnotator`] when an NLP url is configured and the in-process
    /// [`LexiconAnnotator`] otherwise.
    pub fn from_config(cfg: &CoreConfig) -> TriageResult<Self> {
        let translator: Arc<dyn Translate> = match cfg.translate_url() {
            Some(url) => Arc::new(GoogleTranslator::new(url, cfg.translate_timeout())?),
            None => Arc::new(PassthroughTranslator),
        };

        let annotator: Arc<dyn Annotate> = match cfg.nlp_url() {
            Some(url) => Arc::new(HttpAnnotator::new(url, cfg.nlp_timeout())?),
            None => {
                let lexicon = match cfg.lexicon_path() {
                    Some(path) => Lexicon::builtin_with_file(path)?,
                    None => Lexicon::builtin(),
                };
                tracing::info!(entries = lexicon.len(), "using built-in lexicon annotator");
                Arc::new(LexiconAnnotator::new(lexicon))
            }
        };

        Ok(Self::new(
            translator,
            annotator,
            TokenFilter::default(),
            cfg.canonical_language(),
            cfg.translate_timeout(),
            cfg.nlp_timeout(),
        ))
    }

    /// Best-effort translation. Never fails; the raw text is the fallback.
    pub async fn translate_or_raw(&self, text: &RawText) -> String {
        let call = self
            .translator
            .translate(text.as_str(), &self.canonical_language);
        match tokio::time::timeout(self.translate_timeout, call).await {
            Ok(Ok(translated)) => translated,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "translation failed, using original text");
                text.as_str().to_string()
            }
            Err(_) => {
                let e = TriageError::TranslationTimeout(millis(self.translate_timeout));
                tracing::warn!(error = %e, "translation failed, using original text");
                text.as_str().to_string()
            }
        }
    }

    pub async fn extract(&self, text: &RawText) -> TriageResult<Vec<String>> {
        let translated = self.translate_or_raw(text).await;

        let tokens = tokio::time::timeout(self.annotate_timeout, self.annotator.annotate(&translated))
            .await
            .map_err(|_| TriageError::AnnotationTimeout(millis(self.annotate_timeout)))??;

        let symptoms = self.filter.select(&tokens);
        tracing::debug!(tokens = tokens.len(), selected = symptoms.len(), "symptoms extracted");
        Ok(symptoms)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
