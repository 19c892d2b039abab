//! Pure heuristic predictors over the raw query string

use serde::{Deserialize, Serialize};

/// Heuristic difficulty bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Hallucination-risk flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Risk {
    LowRisk,
    HighRisk,
}

/// Bucket a query by word count: short queries are easy, long ones hard
pub fn predict_difficulty(query: &str) -> Difficulty {
    let words = query.split_whitespace().count();
    if words < 4 {
        Difficulty::Easy
    } else if words < 8 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

/// Flag entity-lookup style questions (who/when/where) as high hallucination
/// risk: an ungrounded generative answer to these reads plausible but is
/// frequently wrong.
pub fn predict_risk(query: &str) -> Risk {
    let lower = query.trim().to_lowercase();
    if lower.starts_with("who") || lower.starts_with("when") || lower.starts_with("where") {
        Risk::HighRisk
    } else {
        Risk::LowRisk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_buckets_by_word_count() {
        assert_eq!(predict_difficulty("what is gpa"), Difficulty::Easy);
        assert_eq!(
            predict_difficulty("how do I compute my semester gpa"),
            Difficulty::Medium
        );
        assert_eq!(
            predict_difficulty("how do I compute my cumulative gpa across two different semesters"),
            Difficulty::Hard
        );
    }

    #[test]
    fn entity_lookups_are_high_risk() {
        assert_eq!(predict_risk("who invented calculus"), Risk::HighRisk);
        assert_eq!(predict_risk("When is the exam"), Risk::HighRisk);
        assert_eq!(predict_risk("  where is the library"), Risk::HighRisk);
        assert_eq!(predict_risk("what is the grading system"), Risk::LowRisk);
    }
}
