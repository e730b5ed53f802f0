//! # Triage Core
//!
//! Core logic for the symptom triage service.
//!
//! This crate contains the two request pipelines and the resources they share:
//! - symptom extraction from free text (translation, annotation, filtering)
//! - severity classification from questionnaire answers (encoding table, classifier)
//! - loading of the classifier artifact from a file or an S3-compatible object store
//!
//! **No API concerns**: HTTP routing, request parsing and status codes belong in `api-rest`.

pub mod artifact;
pub mod config;
pub mod constants;
pub mod error;
pub mod extraction;
pub mod severity;

#[cfg(test)]
mod test_support;

pub use config::CoreConfig;
pub use error::{TriageError, TriageResult};
pub use extraction::tokens::RawText;
pub use extraction::SymptomExtractor;
pub use severity::encoding::{FeatureVector, QuestionnaireAnswer};
pub use severity::label::SeverityLabel;
pub use severity::model::Classifier;
pub use severity::{SeverityClassifier, SeverityModel};
