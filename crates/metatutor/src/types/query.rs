//! Validated query type and query request payload

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::MAX_QUERY_CHARS;

/// A validated student query.
///
/// Construction enforces the input contract: trimmed, non-empty, and at most
/// [`MAX_QUERY_CHARS`] characters. Anything else is rejected before the
/// routing pipeline is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query(String);

impl Query {
    /// Parse and validate raw query text
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidQuery(
                "Query must be non-empty and <= 300 characters.".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_QUERY_CHARS {
            return Err(Error::InvalidQuery(
                "Query must be non-empty and <= 300 characters.".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The validated query text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// POST /query request body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The raw query text
    pub query: String,
}
