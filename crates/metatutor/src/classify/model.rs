//! Linear text classifier loaded from a trainer-produced JSON artifact
//!
//! The offline trainers fit a TF-IDF vectorizer plus a linear model and write
//! both out as a single JSON artifact. At query time the classifier is a pure
//! function: vectorize, score, softmax.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// A single classification outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Predicted class label
    pub label: String,
    /// Winning class probability, in [0, 1], rounded to 2 decimals
    pub confidence: f32,
}

/// On-disk artifact written by the offline trainers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Class labels, index-aligned with `coefficients` and `intercepts`
    pub labels: Vec<String>,
    /// Term -> feature index
    pub vocabulary: HashMap<String, usize>,
    /// Per-feature inverse document frequency
    pub idf: Vec<f32>,
    /// Per-class feature weights
    pub coefficients: Vec<Vec<f32>>,
    /// Per-class bias terms
    pub intercepts: Vec<f32>,
}

/// A loaded classification capability
#[derive(Debug)]
pub struct LinearTextClassifier {
    name: String,
    artifact: ClassifierArtifact,
}

impl LinearTextClassifier {
    /// Load a classifier from its JSON artifact.
    ///
    /// A missing or corrupt artifact is fatal for the capability: this is
    /// only called at process start and during a retraining reload, both of
    /// which treat the previous state as authoritative on failure.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::model(name, format!("cannot read {}: {}", path.display(), e)))?;
        let artifact: ClassifierArtifact = serde_json::from_str(&content)
            .map_err(|e| Error::model(name, format!("cannot parse {}: {}", path.display(), e)))?;
        Self::from_artifact(name, artifact)
    }

    /// Build a classifier from an in-memory artifact, validating its shape
    pub fn from_artifact(name: &str, artifact: ClassifierArtifact) -> Result<Self> {
        let features = artifact.idf.len();
        if artifact.labels.is_empty() {
            return Err(Error::model(name, "artifact has no labels"));
        }
        if artifact.coefficients.len() != artifact.labels.len()
            || artifact.intercepts.len() != artifact.labels.len()
        {
            return Err(Error::model(name, "label/coefficient shape mismatch"));
        }
        if artifact.coefficients.iter().any(|row| row.len() != features) {
            return Err(Error::model(name, "coefficient/idf shape mismatch"));
        }
        if artifact.vocabulary.values().any(|&idx| idx >= features) {
            return Err(Error::model(name, "vocabulary index out of range"));
        }
        Ok(Self {
            name: name.to_string(),
            artifact,
        })
    }

    /// Classifier name (domain, intent, quality)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify text into a (label, confidence) pair.
    ///
    /// Never fails: an out-of-vocabulary input still yields scores from the
    /// intercepts alone.
    pub fn predict(&self, text: &str) -> Classification {
        let features = self.vectorize(text);

        let scores: Vec<f32> = self
            .artifact
            .coefficients
            .iter()
            .zip(&self.artifact.intercepts)
            .map(|(weights, bias)| {
                features
                    .iter()
                    .map(|(idx, value)| weights[*idx] * value)
                    .sum::<f32>()
                    + bias
            })
            .collect();

        let probabilities = softmax(&scores);
        let (best, probability) = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .expect("artifact has at least one label");

        Classification {
            label: self.artifact.labels[best].clone(),
            confidence: round2(*probability),
        }
    }

    /// Sparse L2-normalized TF-IDF features of the input
    fn vectorize(&self, text: &str) -> Vec<(usize, f32)> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.artifact.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.artifact.idf[idx]))
            .collect();

        let norm = features
            .iter()
            .map(|(_, v)| v * v)
            .sum::<f32>()
            .sqrt();
        if norm > 0.0 {
            for (_, v) in &mut features {
                *v /= norm;
            }
        }
        features
    }
}

/// Lowercase alphanumeric tokens of length >= 2
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2)
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

pub(crate) fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_artifact() -> ClassifierArtifact {
        // "exam"/"grade" vote STUDENT, "stock"/"market" vote OTHER
        let vocabulary: HashMap<String, usize> = [
            ("exam".to_string(), 0),
            ("grade".to_string(), 1),
            ("stock".to_string(), 2),
            ("market".to_string(), 3),
        ]
        .into_iter()
        .collect();

        ClassifierArtifact {
            labels: vec!["STUDENT".to_string(), "OTHER".to_string()],
            vocabulary,
            idf: vec![1.0; 4],
            coefficients: vec![
                vec![2.0, 2.0, -2.0, -2.0],
                vec![-2.0, -2.0, 2.0, 2.0],
            ],
            intercepts: vec![0.0, 0.0],
        }
    }

    #[test]
    fn predicts_dominant_class() {
        let clf =
            LinearTextClassifier::from_artifact("domain", two_class_artifact()).unwrap();

        let result = clf.predict("when is the exam and what grade do I need");
        assert_eq!(result.label, "STUDENT");
        assert!(result.confidence > 0.5);

        let result = clf.predict("how is the stock market doing");
        assert_eq!(result.label, "OTHER");
    }

    #[test]
    fn confidence_is_bounded_and_rounded() {
        let clf =
            LinearTextClassifier::from_artifact("domain", two_class_artifact()).unwrap();
        let result = clf.predict("exam exam exam");
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
        assert_eq!(result.confidence, round2(result.confidence));
    }

    #[test]
    fn out_of_vocabulary_input_still_classifies() {
        let clf =
            LinearTextClassifier::from_artifact("domain", two_class_artifact()).unwrap();
        let result = clf.predict("zzz qqq");
        // Scores fall back to the intercepts; the result is a valid label.
        assert!(result.label == "STUDENT" || result.label == "OTHER");
    }

    #[test]
    fn rejects_malformed_artifacts() {
        let mut artifact = two_class_artifact();
        artifact.coefficients.pop();
        assert!(LinearTextClassifier::from_artifact("domain", artifact).is_err());

        let mut artifact = two_class_artifact();
        artifact.vocabulary.insert("overflow".to_string(), 99);
        assert!(LinearTextClassifier::from_artifact("domain", artifact).is_err());
    }

    #[test]
    fn load_reports_missing_artifact() {
        let err = LinearTextClassifier::load(
            "domain",
            Path::new("/nonexistent/domain_model.json"),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::Model { .. }));
    }
}
