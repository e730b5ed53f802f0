//! Severity classification pipeline.
//!
//! Questionnaire answers are encoded into a [`FeatureVector`] using the fixed
//! [`encoding::ENCODING_TABLE`], handed to the resident classifier, and the returned class is
//! mapped to a [`SeverityLabel`].

pub mod encoding;
pub mod label;
pub mod model;

use crate::TriageResult;
use encoding::{FeatureVector, QuestionnaireAnswer};
use label::SeverityLabel;
use std::sync::Arc;

/// A loaded predictor: one feature vector in, one class value out.
pub trait SeverityModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> TriageResult<i64>;
}

/// The classification pipeline around a shared, read-only model.
#[derive(Clone)]
pub struct SeverityClassifier {
    model: Arc<dyn SeverityModel>,
}

impl SeverityClassifier {
    pub fn new(model: Arc<dyn SeverityModel>) -> Self {
        Self { model }
    }

    pub fn classify(&self, answers: &QuestionnaireAnswer) -> TriageResult<SeverityLabel> {
        let features = answers.encode();
        let class = self.model.predict(&features)?;
        let label = SeverityLabel::from_class(class).inspect_err(|e| {
            tracing::error!(error = %e, ?features, "classifier output has no label");
        })?;
        tracing::debug!(?features, %label, "severity classified");
        Ok(label)
    }
}
