//! Structural validation of engine output

/// Strings that mark an answer as a placeholder rather than a real response
const PLACEHOLDERS: &[&str] = &[
    "error",
    "none",
    "null",
    "n/a",
    "i don't know",
    "not sure",
    "unknown",
    "no answer",
    "calculation not supported.",
    "i'm sorry, i cannot confidently answer this question.",
];

/// Structural sanity check on engine output: non-empty and not a known
/// placeholder/error string. A pure predicate; the quality gate decides what
/// to do with a failure.
pub fn validate(answer: &str) -> bool {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !PLACEHOLDERS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_answers() {
        assert!(validate("Grades run from A to F on a 10-point scale."));
        assert!(validate("12.0"));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(!validate(""));
        assert!(!validate("   \n"));
    }

    #[test]
    fn rejects_placeholders_case_insensitively() {
        assert!(!validate("ERROR"));
        assert!(!validate("  N/A "));
        assert!(!validate("Calculation not supported."));
        assert!(!validate("I don't know"));
    }
}
