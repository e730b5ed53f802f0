//! Constants used throughout the triage core crate.
//!
//! Defaults for configuration values live here so the server, the CLI and the tests agree on
//! them.

/// Language all free text is translated into before annotation.
pub const DEFAULT_CANONICAL_LANGUAGE: &str = "en";

/// Public endpoint used by the Google translation client.
pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Upper bound on a single translation call.
pub const DEFAULT_TRANSLATE_TIMEOUT_MS: u64 = 5_000;

/// Upper bound on a single annotation call.
pub const DEFAULT_NLP_TIMEOUT_MS: u64 = 10_000;

/// The translation backend refuses inputs longer than this many characters.
pub const MAX_TRANSLATE_CHARS: usize = 5_000;

/// Entity labels that mark a token as a symptom.
pub const SYMPTOM_ENTITY_LABELS: [&str; 2] = ["DISEASE", "SYMPTOM"];

/// Object key of the classifier artifact when none is configured.
pub const DEFAULT_MODEL_KEY: &str = "severity_model.json";

/// Region used for the object store when `AWS_REGION` is not set.
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// `format` marker every classifier artifact must carry.
pub const ARTIFACT_FORMAT: &str = "triage-classifier";

/// Artifact schema version understood by this build.
pub const ARTIFACT_VERSION: u32 = 1;
