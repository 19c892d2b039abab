//! Calculator engine: keyword-dispatched arithmetic over extracted numbers

use async_trait::async_trait;
use regex::Regex;

use super::{Engine, EngineKind, EngineResponse};

const NOT_SUPPORTED: &str = "Calculation not supported.";

/// Deterministic arithmetic engine.
///
/// Extracts all numeric literals from the query, then dispatches on keyword
/// presence. Multiply, add, and percentage are pairwise over the first two
/// numbers; average consumes every extracted number.
pub struct CalculatorEngine {
    number_pattern: Regex,
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorEngine {
    pub fn new() -> Self {
        Self {
            number_pattern: Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number pattern"),
        }
    }

    /// Extract all numeric literals in query order
    fn extract_numbers(&self, query: &str) -> Vec<f64> {
        self.number_pattern
            .find_iter(query)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect()
    }

    fn compute(&self, query: &str) -> Option<String> {
        let numbers = self.extract_numbers(query);
        let words: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect();
        let has = |term: &str| words.iter().any(|w| w == term);

        if has("multiply") && numbers.len() >= 2 {
            return Some(format_number(numbers[0] * numbers[1]));
        }
        if (has("add") || has("sum")) && numbers.len() >= 2 {
            return Some(format_number(numbers[0] + numbers[1]));
        }
        if (has("percentage") || has("percent")) && numbers.len() >= 2 && numbers[1] != 0.0 {
            return Some(format!("{}%", format_number(numbers[0] / numbers[1] * 100.0)));
        }
        if (has("average") || has("cgpa") || has("gpa")) && !numbers.is_empty() {
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            return Some(format_number(mean));
        }
        None
    }
}

#[async_trait]
impl Engine for CalculatorEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Calculator
    }

    async fn answer(&self, query: &str) -> EngineResponse {
        match self.compute(query) {
            Some(answer) => EngineResponse {
                answer,
                confidence: 1.0,
                source: Some("calculator".to_string()),
            },
            None => EngineResponse::unsupported(NOT_SUPPORTED),
        }
    }
}

/// Render with at least one decimal place: 12 -> "12.0", 2.55 -> "2.55"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multiply_is_pairwise() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("multiply 3 and 4").await;
        assert_eq!(response.answer, "12.0");
        assert_eq!(response.confidence, 1.0);
        assert_eq!(response.source.as_deref(), Some("calculator"));
    }

    #[tokio::test]
    async fn add_uses_first_two_numbers() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("add 2, 5, 10").await;
        assert_eq!(response.answer, "7.0");
    }

    #[tokio::test]
    async fn percentage_formats_with_suffix() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("percentage 50 200").await;
        assert_eq!(response.answer, "25.0%");
    }

    #[tokio::test]
    async fn gpa_keywords_average_all_numbers() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("what is my cgpa with 8 9 10").await;
        assert_eq!(response.answer, "9.0");

        let response = engine.answer("average of 2 and 3").await;
        assert_eq!(response.answer, "2.5");
    }

    #[tokio::test]
    async fn handles_float_literals() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("multiply 1.5 and 2").await;
        assert_eq!(response.answer, "3.0");
    }

    #[tokio::test]
    async fn wrong_arity_is_unsupported() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("multiply 3").await;
        assert_eq!(response.answer, NOT_SUPPORTED);
        assert_eq!(response.confidence, 0.0);
        assert!(response.source.is_none());
    }

    #[tokio::test]
    async fn keyword_must_be_a_whole_word() {
        let engine = CalculatorEngine::new();
        // "address" must not trigger the add operation
        let response = engine.answer("address 12 and 14 on campus").await;
        assert_eq!(response.answer, NOT_SUPPORTED);
    }

    #[tokio::test]
    async fn division_by_zero_percentage_is_unsupported() {
        let engine = CalculatorEngine::new();
        let response = engine.answer("percentage 50 0").await;
        assert_eq!(response.answer, NOT_SUPPORTED);
    }
}
