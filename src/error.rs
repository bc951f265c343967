//! Error types for facet loading, range parsing and filter construction.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, FacetError>;

/// Errors raised by the facet core.
///
/// Failures are local to one facet field on one segment: callers treat them as
/// fatal for that facet dimension and keep going with the others.
#[derive(Debug, Error)]
pub enum FacetError {
    /// The segment could not be read, is corrupt, or lacks the field.
    #[error("index error: {0}")]
    Index(String),

    /// A range expression could not be parsed.
    #[error("malformed range expression '{range}': {reason}")]
    RangeSyntax { range: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FacetError {
    pub fn index(msg: impl Into<String>) -> Self {
        FacetError::Index(msg.into())
    }

    pub fn range_syntax(range: impl Into<String>, reason: impl Into<String>) -> Self {
        FacetError::RangeSyntax {
            range: range.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        FacetError::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        FacetError::InvalidConfig(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        FacetError::NotFound(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_syntax_names_offending_string() {
        let err = FacetError::range_syntax("10 TO 20", "missing opening bracket");
        let msg = err.to_string();
        assert!(msg.contains("'10 TO 20'"));
        assert!(msg.contains("missing opening bracket"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: FacetError = parsed.unwrap_err().into();
        assert!(matches!(err, FacetError::Json(_)));
    }
}
