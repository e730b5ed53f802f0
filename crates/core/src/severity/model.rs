//! Serialized classifier artifact and the predictor built from it.
//!
//! The artifact is a JSON document:
//!
//! ```json
//! {
//!   "format": "triage-classifier",
//!   "version": 1,
//!   "feature_names": ["age", "gender", "..."],
//!   "classes": [0, 1, 2],
//!   "model": { "kind": "random_forest", "trees": [ ... ] }
//! }
//! ```
//!
//! Trees use parallel arrays indexed by node id (`children_left`, `children_right`, `feature`,
//! `threshold`, `value`), with `-1` children marking a leaf. A sample descends left when
//! `x[feature] <= threshold`. Prediction returns `classes[argmax]`, taking the first maximum on
//! ties.

use super::encoding::{feature_names, FeatureVector, FEATURE_COUNT};
use super::SeverityModel;
use crate::constants::{ARTIFACT_FORMAT, ARTIFACT_VERSION};
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierArtifact {
    pub format: String,
    pub version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    DecisionTree(TreeSpec),
    RandomForest { trees: Vec<TreeSpec> },
    LogisticRegression {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probabilities: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_spec(spec: &TreeSpec, class_count: usize, tree_index: usize) -> TriageResult<Self> {
        let invalid = |reason: String| {
            TriageError::InvalidArtifact(format!("tree {tree_index}: {reason}"))
        };

        let count = spec.children_left.len();
        if count == 0 {
            return Err(invalid("has no nodes".into()));
        }
        if [
            spec.children_right.len(),
            spec.feature.len(),
            spec.threshold.len(),
            spec.value.len(),
        ]
        .iter()
        .any(|len| *len != count)
        {
            return Err(invalid("node arrays have different lengths".into()));
        }

        let mut nodes = Vec::with_capacity(count);
        for id in 0..count {
            let (left, right) = (spec.children_left[id], spec.children_right[id]);
            let node = match (left, right) {
                (-1, -1) => {
                    let weights = &spec.value[id];
                    if weights.len() != class_count {
                        return Err(invalid(format!(
                            "node {id} has {} class weights, expected {class_count}",
                            weights.len()
                        )));
                    }
                    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(invalid(format!("node {id} has a negative or non-finite weight")));
                    }
                    let total: f64 = weights.iter().sum();
                    if total <= 0.0 {
                        return Err(invalid(format!("node {id} has no class weight")));
                    }
                    Node::Leaf {
                        probabilities: weights.iter().map(|w| w / total).collect(),
                    }
                }
                (l, r) if l >= 0 && r >= 0 => {
                    let (left, right) = (l as usize, r as usize);
                    // Children must point forward so every walk terminates.
                    if left <= id || right <= id || left >= count || right >= count {
                        return Err(invalid(format!("node {id} has out-of-order children")));
                    }
                    let feature = usize::try_from(spec.feature[id])
                        .ok()
                        .filter(|f| *f < FEATURE_COUNT)
                        .ok_or_else(|| {
                            invalid(format!(
                                "node {id} splits on feature {}, expected 0..{FEATURE_COUNT}",
                                spec.feature[id]
                            ))
                        })?;
                    let threshold = spec.threshold[id];
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {id} has a non-finite threshold")));
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
                _ => return Err(invalid(format!("node {id} has only one child"))),
            };
            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    fn probabilities(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => id = if x[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { probabilities } => return probabilities,
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Predictor {
    Tree(DecisionTree),
    Forest(Vec<DecisionTree>),
    Linear {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

/// A validated, ready-to-run classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    classes: Vec<i64>,
    predictor: Predictor,
}

impl Classifier {
    /// Deserialize and validate artifact bytes.
    pub fn from_slice(bytes: &[u8]) -> TriageResult<Self> {
        let de = &mut serde_json::Deserializer::from_slice(bytes);
        let artifact: ClassifierArtifact = serde_path_to_error::deserialize(de)
            .map_err(|e| TriageError::ArtifactDeserialization(e.to_string()))?;
        Self::from_artifact(&artifact)
    }

    pub fn from_artifact(artifact: &ClassifierArtifact) -> TriageResult<Self> {
        if artifact.format != ARTIFACT_FORMAT {
            return Err(TriageError::InvalidArtifact(format!(
                "format is {:?}, expected {ARTIFACT_FORMAT:?}",
                artifact.format
            )));
        }
        if artifact.version != ARTIFACT_VERSION {
            return Err(TriageError::InvalidArtifact(format!(
                "version {} is not supported, expected {ARTIFACT_VERSION}",
                artifact.version
            )));
        }
        let expected = feature_names();
        if artifact.feature_names.len() != expected.len()
            || artifact.feature_names.iter().zip(expected.iter()).any(|(a, e)| a != e)
        {
            return Err(TriageError::InvalidArtifact(format!(
                "feature_names {:?} do not match the encoding table {expected:?}",
                artifact.feature_names
            )));
        }
        if artifact.classes.is_empty() {
            return Err(TriageError::InvalidArtifact("classes is empty".into()));
        }

        let class_count = artifact.classes.len();
        let predictor = match &artifact.model {
            ModelSpec::DecisionTree(spec) => {
                Predictor::Tree(DecisionTree::from_spec(spec, class_count, 0)?)
            }
            ModelSpec::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(TriageError::InvalidArtifact("forest has no trees".into()));
                }
                let trees = trees
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| DecisionTree::from_spec(spec, class_count, i))
                    .collect::<TriageResult<Vec<_>>>()?;
                Predictor::Forest(trees)
            }
            ModelSpec::LogisticRegression { coef, intercept } => {
                if class_count < 2 {
                    return Err(TriageError::InvalidArtifact(
                        "logistic regression needs at least two classes".into(),
                    ));
                }
                let binary = class_count == 2 && coef.len() == 1;
                if !binary && coef.len() != class_count {
                    return Err(TriageError::InvalidArtifact(format!(
                        "coef has {} rows for {class_count} classes",
                        coef.len()
                    )));
                }
                if intercept.len() != coef.len() {
                    return Err(TriageError::InvalidArtifact(
                        "intercept length does not match coef rows".into(),
                    ));
                }
                if coef.iter().any(|row| row.len() != FEATURE_COUNT) {
                    return Err(TriageError::InvalidArtifact(format!(
                        "every coef row needs {FEATURE_COUNT} weights"
                    )));
                }
                if coef.iter().flatten().chain(intercept).any(|w| !w.is_finite()) {
                    return Err(TriageError::InvalidArtifact(
                        "coef and intercept must be finite".into(),
                    ));
                }
                Predictor::Linear {
                    coef: coef.clone(),
                    intercept: intercept.clone(),
                }
            }
        };

        Ok(Self {
            classes: artifact.classes.clone(),
            predictor,
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Short human-readable description, e.g. `random_forest (100 trees, 3 classes)`.
    pub fn summary(&self) -> String {
        let classes = self.classes.len();
        match &self.predictor {
            Predictor::Tree(tree) => {
                format!("decision_tree ({} nodes, {classes} classes)", tree.nodes.len())
            }
            Predictor::Forest(trees) => {
                format!("random_forest ({} trees, {classes} classes)", trees.len())
            }
            Predictor::Linear { .. } => format!("logistic_regression ({classes} classes)"),
        }
    }

    fn class_index(&self, x: &[f64; FEATURE_COUNT]) -> usize {
        match &self.predictor {
            Predictor::Tree(tree) => argmax(tree.probabilities(x)),
            Predictor::Forest(trees) => {
                let mut totals = vec![0.0; self.classes.len()];
                for tree in trees {
                    for (total, p) in totals.iter_mut().zip(tree.probabilities(x)) {
                        *total += p;
                    }
                }
                argmax(&totals)
            }
            Predictor::Linear { coef, intercept } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
                    .collect();
                if scores.len() == 1 {
                    usize::from(scores[0] > 0.0)
                } else {
                    argmax(&scores)
                }
            }
        }
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

impl SeverityModel for Classifier {
    fn predict(&self, features: &FeatureVector) -> TriageResult<i64> {
        let index = self.class_index(&features.to_f64());
        self.classes.get(index).copied().ok_or_else(|| {
            TriageError::InvalidArtifact(format!(
                "model chose class position {index} of {}",
                self.classes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn names() -> Value {
        json!(feature_names())
    }

    /// energyLevel <= 3.5 -> High; otherwise age <= 50 -> Normal, else Medium.
    fn tree() -> Value {
        json!({
            "children_left":  [1, -1, 3, -1, -1],
            "children_right": [2, -1, 4, -1, -1],
            "feature":        [9, -2, 0, -2, -2],
            "threshold":      [3.5, -2.0, 50.0, -2.0, -2.0],
            "value": [[5.0, 4.0, 5.0], [0.0, 0.0, 5.0], [5.0, 4.0, 0.0], [4.0, 1.0, 0.0], [1.0, 3.0, 0.0]]
        })
    }

    fn artifact(model: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "format": "triage-classifier",
            "version": 1,
            "feature_names": names(),
            "classes": [0, 1, 2],
            "model": model
        }))
        .unwrap()
    }

    fn features(age: i64, energy: i64) -> FeatureVector {
        FeatureVector::from([age, 2, 2, 0, 0, 0, 0, 1, 0, energy, 0, 1, 0])
    }

    fn with_kind(kind: &str, mut body: Value) -> Value {
        body["kind"] = json!(kind);
        body
    }

    #[test]
    fn decision_tree_walks_thresholds() {
        let classifier = Classifier::from_slice(&artifact(with_kind("decision_tree", tree())))
            .expect("valid tree");

        assert_eq!(classifier.predict(&features(30, 2)).unwrap(), 2);
        assert_eq!(classifier.predict(&features(30, 5)).unwrap(), 0);
        assert_eq!(classifier.predict(&features(50, 5)).unwrap(), 0);
        assert_eq!(classifier.predict(&features(51, 5)).unwrap(), 1);
        assert_eq!(classifier.summary(), "decision_tree (5 nodes, 3 classes)");
    }

    #[test]
    fn forest_averages_tree_probabilities() {
        // A stump that always says Medium with weight 0.6 vs Normal 0.4.
        let stump = json!({
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [[4.0, 6.0, 0.0]]
        });
        let model = json!({ "kind": "random_forest", "trees": [tree(), stump] });
        let classifier = Classifier::from_slice(&artifact(model)).expect("valid forest");

        // tree: Normal 0.8 / Medium 0.2, stump: Normal 0.4 / Medium 0.6 -> Normal.
        assert_eq!(classifier.predict(&features(30, 5)).unwrap(), 0);
        // tree: High 1.0, stump: Medium 0.6 -> High 0.5 vs Medium 0.3.
        assert_eq!(classifier.predict(&features(30, 1)).unwrap(), 2);
    }

    #[test]
    fn logistic_regression_takes_highest_score() {
        let mut coef = vec![vec![0.0; FEATURE_COUNT]; 3];
        coef[2][9] = -1.0; // low energy raises High
        coef[1][0] = 0.1; // age raises Medium
        let model = json!({
            "kind": "logistic_regression",
            "coef": coef,
            "intercept": [0.0, -4.0, 3.0]
        });
        let classifier = Classifier::from_slice(&artifact(model)).expect("valid linear model");

        assert_eq!(classifier.predict(&features(20, 1)).unwrap(), 2);
        assert_eq!(classifier.predict(&features(20, 8)).unwrap(), 0);
        assert_eq!(classifier.predict(&features(70, 8)).unwrap(), 1);
    }

    fn linear_with_classes(classes: Value, coef: Vec<Vec<f64>>, intercept: Value) -> Vec<u8> {
        let model = json!({ "kind": "logistic_regression", "coef": coef, "intercept": intercept });
        let mut doc: Value = serde_json::from_slice(&artifact(model)).unwrap();
        doc["classes"] = classes;
        serde_json::to_vec(&doc).unwrap()
    }

    #[test]
    fn single_row_logistic_is_binary() {
        let mut coef = vec![vec![0.0; FEATURE_COUNT]];
        coef[0][9] = -1.0;
        let bytes = linear_with_classes(json!([0, 2]), coef, json!([3.0]));
        let classifier = Classifier::from_slice(&bytes).expect("binary linear model");

        assert_eq!(classifier.predict(&features(45, 1)).unwrap(), 2);
        assert_eq!(classifier.predict(&features(45, 8)).unwrap(), 0);
    }

    #[test]
    fn rejects_single_class_logistic() {
        let bytes = linear_with_classes(json!([0]), vec![vec![0.0; FEATURE_COUNT]], json!([0.0]));
        let err = Classifier::from_slice(&bytes).expect_err("one class");
        assert!(matches!(err, TriageError::InvalidArtifact(_)));
    }

    #[test]
    fn rejects_single_row_logistic_for_three_classes() {
        let bytes =
            linear_with_classes(json!([0, 1, 2]), vec![vec![0.0; FEATURE_COUNT]], json!([0.0]));
        assert!(matches!(
            Classifier::from_slice(&bytes),
            Err(TriageError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn returns_class_values_not_positions() {
        let mut doc: Value = serde_json::from_slice(&artifact(with_kind("decision_tree", tree())))
            .unwrap();
        doc["classes"] = json!([0, 1, 5]);
        let classifier = Classifier::from_slice(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(classifier.predict(&features(30, 1)).unwrap(), 5);
    }

    #[test]
    fn rejects_feature_names_in_another_order() {
        let mut doc: Value = serde_json::from_slice(&artifact(with_kind("decision_tree", tree())))
            .unwrap();
        let mut reordered = feature_names().to_vec();
        reordered.swap(0, 1);
        doc["feature_names"] = json!(reordered);

        let err = Classifier::from_slice(&serde_json::to_vec(&doc).unwrap())
            .expect_err("reordered features");
        match err {
            TriageError::InvalidArtifact(msg) => assert!(msg.contains("feature_names")),
            other => panic!("expected InvalidArtifact, got {other:?}"),
        }
    }

    #[test]
    fn rejects_backward_children() {
        let mut bad = tree();
        bad["children_left"] = json!([1, -1, 0, -1, -1]);
        let err = Classifier::from_slice(&artifact(with_kind("decision_tree", bad)))
            .expect_err("cycle");
        match err {
            TriageError::InvalidArtifact(msg) => assert!(msg.contains("node 2")),
            other => panic!("expected InvalidArtifact, got {other:?}"),
        }
    }

    #[test]
    fn rejects_leaf_with_wrong_class_width() {
        let mut bad = tree();
        bad["value"][1] = json!([1.0, 2.0]);
        assert!(matches!(
            Classifier::from_slice(&artifact(with_kind("decision_tree", bad))),
            Err(TriageError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind_and_format() {
        let err = Classifier::from_slice(&artifact(json!({ "kind": "svm" })))
            .expect_err("unknown kind");
        assert!(matches!(err, TriageError::ArtifactDeserialization(_)));

        let mut doc: Value = serde_json::from_slice(&artifact(with_kind("decision_tree", tree())))
            .unwrap();
        doc["format"] = json!("pickle");
        let err = Classifier::from_slice(&serde_json::to_vec(&doc).unwrap())
            .expect_err("wrong format");
        assert!(matches!(err, TriageError::InvalidArtifact(_)));
    }

    #[test]
    fn rejects_non_json_bytes() {
        let err = Classifier::from_slice(b"\x80\x04\x95pickle").expect_err("not json");
        assert!(matches!(err, TriageError::ArtifactDeserialization(_)));
    }
}
