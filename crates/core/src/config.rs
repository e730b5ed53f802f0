//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the pipelines. Nothing
//! in this crate reads process-wide environment variables while handling a request; the binaries
//! own that step and hand the parsed values over through [`CoreConfig::new`].

use crate::constants::{
    DEFAULT_CANONICAL_LANGUAGE, DEFAULT_NLP_TIMEOUT_MS, DEFAULT_TRANSLATE_TIMEOUT_MS,
    DEFAULT_TRANSLATE_URL,
};
use crate::{TriageError, TriageResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    canonical_language: String,
    translate_url: Option<String>,
    translate_timeout: Duration,
    nlp_url: Option<String>,
    nlp_timeout: Duration,
    lexicon_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// A `translate_url` of `None` disables translation (text goes to the annotator as typed).
    /// A `nlp_url` of `None` selects the built-in lexicon annotator.
    pub fn new(
        canonical_language: String,
        translate_url: Option<String>,
        translate_timeout: Duration,
        nlp_url: Option<String>,
        nlp_timeout: Duration,
        lexicon_path: Option<PathBuf>,
    ) -> TriageResult<Self> {
        let canonical_language = canonical_language.trim().to_string();
        if canonical_language.is_empty() {
            return Err(TriageError::InvalidConfig(
                "canonical language cannot be empty".into(),
            ));
        }
        if let Some(url) = &translate_url {
            validate_http_url("translate url", url)?;
        }
        if let Some(url) = &nlp_url {
            validate_http_url("nlp url", url)?;
        }
        if translate_timeout.is_zero() || nlp_timeout.is_zero() {
            return Err(TriageError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }

        Ok(Self {
            canonical_language,
            translate_url,
            translate_timeout,
            nlp_url,
            nlp_timeout,
            lexicon_path,
        })
    }

    /// Resolve configuration from named settings.
    ///
    /// `lookup` returns the value of a setting (normally an environment variable); unset and
    /// blank values take the defaults from [`crate::constants`].
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> TriageResult<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let translation =
            switch_from_env_value("TRIAGE_TRANSLATION", lookup("TRIAGE_TRANSLATION"), true)?;
        let translate_url = translation.then(|| {
            get("TRIAGE_TRANSLATE_URL").unwrap_or_else(|| DEFAULT_TRANSLATE_URL.into())
        });

        Self::new(
            get("TRIAGE_CANONICAL_LANGUAGE").unwrap_or_else(|| DEFAULT_CANONICAL_LANGUAGE.into()),
            translate_url,
            timeout_from_env_value(
                "TRIAGE_TRANSLATE_TIMEOUT_MS",
                lookup("TRIAGE_TRANSLATE_TIMEOUT_MS"),
                DEFAULT_TRANSLATE_TIMEOUT_MS,
            )?,
            get("TRIAGE_NLP_URL"),
            timeout_from_env_value(
                "TRIAGE_NLP_TIMEOUT_MS",
                lookup("TRIAGE_NLP_TIMEOUT_MS"),
                DEFAULT_NLP_TIMEOUT_MS,
            )?,
            get("TRIAGE_LEXICON_PATH").map(PathBuf::from),
        )
    }

    pub fn canonical_language(&self) -> &str {
        &self.canonical_language
    }

    pub fn translate_url(&self) -> Option<&str> {
        self.translate_url.as_deref()
    }

    pub fn translate_timeout(&self) -> Duration {
        self.translate_timeout
    }

    pub fn nlp_url(&self) -> Option<&str> {
        self.nlp_url.as_deref()
    }

    pub fn nlp_timeout(&self) -> Duration {
        self.nlp_timeout
    }

    pub fn lexicon_path(&self) -> Option<&Path> {
        self.lexicon_path.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            canonical_language: DEFAULT_CANONICAL_LANGUAGE.into(),
            translate_url: Some(DEFAULT_TRANSLATE_URL.into()),
            translate_timeout: Duration::from_millis(DEFAULT_TRANSLATE_TIMEOUT_MS),
            nlp_url: None,
            nlp_timeout: Duration::from_millis(DEFAULT_NLP_TIMEOUT_MS),
            lexicon_path: None,
        }
    }
}

fn validate_http_url(what: &str, url: &str) -> TriageResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(TriageError::InvalidConfig(format!(
            "{what} must start with http:// or https://, got {url:?}"
        )))
    }
}

/// Parse a millisecond timeout from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default_ms`.
pub fn timeout_from_env_value(
    name: &str,
    value: Option<String>,
    default_ms: u64,
) -> TriageResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let millis = match value {
        Some(v) => v.parse::<u64>().map_err(|_| {
            TriageError::InvalidConfig(format!("{name} must be a whole number of milliseconds"))
        })?,
        None => default_ms,
    };

    Ok(Duration::from_millis(millis))
}

/// Parse an on/off switch from an optional string value.
///
/// Accepts `on`/`off`, `true`/`false`, `1`/`0` and `yes`/`no`, case-insensitively. Missing or
/// empty values resolve to `default`.
pub fn switch_from_env_value(name: &str, value: Option<String>, default: bool) -> TriageResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());
    match value.as_deref() {
        None => Ok(default),
        Some("on" | "true" | "1" | "yes") => Ok(true),
        Some("off" | "false" | "0" | "no") => Ok(false),
        Some(other) => Err(TriageError::InvalidConfig(format!(
            "{name} must be on or off, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_canonical_language() {
        let err = CoreConfig::new(
            "  ".into(),
            None,
            Duration::from_secs(1),
            None,
            Duration::from_secs(1),
            None,
        )
        .expect_err("blank language should be rejected");
        assert!(matches!(err, TriageError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = CoreConfig::new(
            "en".into(),
            Some("ftp://translate.example".into()),
            Duration::from_secs(1),
            None,
            Duration::from_secs(1),
            None,
        )
        .expect_err("ftp url should be rejected");
        match err {
            TriageError::InvalidConfig(msg) => assert!(msg.contains("translate url")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_translates_to_english_with_lexicon_annotator() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.canonical_language(), "en");
        assert_eq!(cfg.translate_url(), Some(DEFAULT_TRANSLATE_URL));
        assert!(cfg.nlp_url().is_none());
    }

    #[test]
    fn resolve_reads_named_settings() {
        let cfg = CoreConfig::resolve(|name| match name {
            "TRIAGE_TRANSLATION" => Some("off".into()),
            "TRIAGE_TRANSLATE_URL" => Some("http://unused.example".into()),
            "TRIAGE_NLP_URL" => Some("http://nlp.internal:8080/annotate".into()),
            "TRIAGE_NLP_TIMEOUT_MS" => Some("2500".into()),
            "TRIAGE_LEXICON_PATH" => Some("  ".into()),
            _ => None,
        })
        .expect("valid settings");

        assert_eq!(cfg.translate_url(), None);
        assert_eq!(cfg.nlp_url(), Some("http://nlp.internal:8080/annotate"));
        assert_eq!(cfg.nlp_timeout(), Duration::from_millis(2500));
        assert_eq!(
            cfg.translate_timeout(),
            Duration::from_millis(DEFAULT_TRANSLATE_TIMEOUT_MS)
        );
        assert!(cfg.lexicon_path().is_none());
    }

    #[test]
    fn resolve_with_nothing_set_matches_default() {
        let cfg = CoreConfig::resolve(|_| None).expect("defaults");
        let default = CoreConfig::default();
        assert_eq!(cfg.canonical_language(), default.canonical_language());
        assert_eq!(cfg.translate_url(), default.translate_url());
        assert_eq!(cfg.nlp_url(), default.nlp_url());
    }

    #[test]
    fn timeout_uses_default_when_unset_or_blank() {
        assert_eq!(
            timeout_from_env_value("T", None, 250).unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            timeout_from_env_value("T", Some(" ".into()), 250).unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            timeout_from_env_value("T", Some("1200".into()), 250).unwrap(),
            Duration::from_millis(1200)
        );
        assert!(timeout_from_env_value("T", Some("soon".into()), 250).is_err());
    }

    #[test]
    fn switch_parses_common_spellings() {
        assert!(switch_from_env_value("S", Some("ON".into()), false).unwrap());
        assert!(!switch_from_env_value("S", Some("no".into()), true).unwrap());
        assert!(switch_from_env_value("S", None, true).unwrap());
        assert!(switch_from_env_value("S", Some("maybe".into()), true).is_err());
    }
}
