//! Questionnaire encoding table.
//!
//! The classifier was trained on feature vectors laid out exactly as [`ENCODING_TABLE`]. The
//! table is a versioned contract: reordering rows or renumbering categories silently corrupts
//! predictions, so any change must ship with a retrained artifact. Artifacts record the feature
//! names they were trained with and the loader refuses a mismatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FEATURE_COUNT: usize = 13;

/// How one questionnaire field becomes one integer feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// Whole number. Accepts integers, floats (truncated), numeric strings and booleans.
    Integer { default: i64 },
    /// Yes/no flag encoded as 0/1. Accepts booleans and numbers (non-zero is yes).
    Boolean { default: bool },
    /// Exact label lookup.
    Categorical {
        categories: &'static [(&'static str, i64)],
        default: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub encoding: Encoding,
}

const GENDER: &[(&str, i64)] = &[("Male", 0), ("Female", 1), ("Other", 2)];
const DIET: &[(&str, i64)] = &[("Never", 0), ("Rarely", 1), ("Sometimes", 2), ("Always", 3)];
const EXERCISE: &[(&str, i64)] = &[("Never", 0), ("Rarely", 1), ("Sometimes", 2), ("Daily", 3)];
const STRESS: &[(&str, i64)] = &[("Low", 0), ("Medium", 1), ("High", 2)];
const SYMPTOM_WORSENING: &[(&str, i64)] =
    &[("No Change", 0), ("Slightly Worse", 1), ("Much Worse", 2)];
const SYMPTOM_TREND: &[(&str, i64)] = &[("Improving", 0), ("Stable", 1), ("Worsening", 2)];

/// Field order and fallbacks, in the order the classifier expects them.
pub const ENCODING_TABLE: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "age",
        encoding: Encoding::Integer { default: 30 },
    },
    FieldSpec {
        name: "gender",
        encoding: Encoding::Categorical {
            categories: GENDER,
            default: 2,
        },
    },
    FieldSpec {
        name: "diet",
        encoding: Encoding::Categorical {
            categories: DIET,
            default: 2,
        },
    },
    FieldSpec {
        name: "exercise",
        encoding: Encoding::Categorical {
            categories: EXERCISE,
            default: 0,
        },
    },
    FieldSpec {
        name: "weightChange",
        encoding: Encoding::Boolean { default: false },
    },
    FieldSpec {
        name: "smokeAlcohol",
        encoding: Encoding::Boolean { default: false },
    },
    FieldSpec {
        name: "medications",
        encoding: Encoding::Boolean { default: false },
    },
    FieldSpec {
        name: "stress",
        encoding: Encoding::Categorical {
            categories: STRESS,
            default: 1,
        },
    },
    FieldSpec {
        name: "sleepIssues",
        encoding: Encoding::Boolean { default: false },
    },
    FieldSpec {
        name: "energyLevel",
        encoding: Encoding::Integer { default: 5 },
    },
    FieldSpec {
        name: "symptomWorsening",
        encoding: Encoding::Categorical {
            categories: SYMPTOM_WORSENING,
            default: 0,
        },
    },
    FieldSpec {
        name: "symptomTrend",
        encoding: Encoding::Categorical {
            categories: SYMPTOM_TREND,
            default: 1,
        },
    },
    FieldSpec {
        name: "consultedDoctor",
        encoding: Encoding::Boolean { default: false },
    },
];

/// Field names in feature order.
pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
    ENCODING_TABLE.map(|field| field.name)
}

impl FieldSpec {
    /// Encode a value, or the field's default when it is missing or not recognised.
    pub fn encode(&self, value: Option<&Value>) -> i64 {
        let encoded = value.and_then(|value| match self.encoding {
            Encoding::Integer { .. } => lenient_integer(value),
            Encoding::Boolean { .. } => lenient_boolean(value),
            Encoding::Categorical { categories, .. } => value.as_str().and_then(|label| {
                categories
                    .iter()
                    .find(|(name, _)| *name == label)
                    .map(|(_, code)| *code)
            }),
        });

        encoded.unwrap_or_else(|| {
            if value.is_some() {
                tracing::debug!(field = self.name, "unrecognised value, using default");
            }
            self.fallback()
        })
    }

    pub fn fallback(&self) -> i64 {
        match self.encoding {
            Encoding::Integer { default } => default,
            Encoding::Boolean { default } => i64::from(default),
            Encoding::Categorical { default, .. } => default,
        }
    }
}

fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn lenient_boolean(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_f64().map(|f| i64::from(f != 0.0)),
        _ => None,
    }
}

/// Questionnaire answers as submitted, keyed by field name.
///
/// Unknown keys are kept but ignored by the encoder; `null` counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionnaireAnswer(Map<String, Value>);

impl QuestionnaireAnswer {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Encode every field in table order.
    pub fn encode(&self) -> FeatureVector {
        let mut values = [0i64; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(ENCODING_TABLE.iter()) {
            *slot = field.encode(self.get(field.name));
        }
        FeatureVector(values)
    }
}

/// Fixed-order integer features, one per [`ENCODING_TABLE`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureVector([i64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.0.get(index).copied()
    }

    pub fn to_f64(&self) -> [f64; FEATURE_COUNT] {
        self.0.map(|v| v as f64)
    }
}

impl From<[i64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [i64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}
