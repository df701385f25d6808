//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid observations or a broken tree.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("hostname has no '{separator}' separator: {hostname}")]
    MissingSeparator { hostname: String, separator: char },

    #[error("hostname has an empty top-level domain: {0}")]
    EmptyTld(String),

    #[error("malformed observation, expected '<date> <hostname>': {0}")]
    MalformedLine(String),

    #[error("tree invariant violated: {0}")]
    CorruptTree(String),
}

impl DomainError {
    pub(crate) fn invalid_date(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
