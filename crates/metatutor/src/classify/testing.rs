//! Classifier and bundle fixtures shared across test modules

use chrono::Utc;
use std::collections::HashMap;

use crate::engines::lexical::{KbEntry, LexicalEngine, DEFAULT_SIMILARITY_FLOOR};

use super::bundle::ClassifierBundle;
use super::model::{ClassifierArtifact, LinearTextClassifier};

/// Build a classifier that maps keyword presence to a label, falling back to
/// `default_label` for inputs matching no keyword.
pub(crate) fn keyword_classifier(
    name: &str,
    mapping: &[(&str, &str)],
    default_label: &str,
) -> LinearTextClassifier {
    let mut labels: Vec<String> = vec![default_label.to_string()];
    for (_, label) in mapping {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    let vocabulary: HashMap<String, usize> = mapping
        .iter()
        .enumerate()
        .map(|(idx, (term, _))| (term.to_string(), idx))
        .collect();

    let features = mapping.len();
    let mut coefficients = vec![vec![0.0f32; features]; labels.len()];
    for (term_idx, (_, label)) in mapping.iter().enumerate() {
        let label_idx = labels.iter().position(|l| l == label).unwrap();
        coefficients[label_idx][term_idx] = 8.0;
    }

    let mut intercepts = vec![0.0f32; labels.len()];
    intercepts[0] = 0.5;

    LinearTextClassifier::from_artifact(
        name,
        ClassifierArtifact {
            labels,
            vocabulary,
            idf: vec![1.0; features],
            coefficients,
            intercepts,
        },
    )
    .expect("fixture artifact is well-formed")
}

/// A bundle with keyword-driven classifiers and the given lexical corpus
pub(crate) fn keyword_bundle(
    domain_mapping: &[(&str, &str)],
    intent_mapping: &[(&str, &str)],
    quality_mapping: &[(&str, &str)],
    corpus: Vec<KbEntry>,
) -> ClassifierBundle {
    ClassifierBundle {
        domain: keyword_classifier("domain", domain_mapping, "STUDENT"),
        intent: keyword_classifier("intent", intent_mapping, "FACTUAL"),
        quality: keyword_classifier("quality", quality_mapping, "SAFE"),
        lexical: LexicalEngine::fit(corpus, DEFAULT_SIMILARITY_FLOOR),
        version: 0,
        loaded_at: Utc::now(),
    }
}

/// Shorthand corpus entry
pub(crate) fn kb_entry(question: &str, answer: &str, category: Option<&str>) -> KbEntry {
    KbEntry {
        question: question.to_string(),
        answer: answer.to_string(),
        category: category.map(|c| c.to_string()),
    }
}
