//! Error types for issue intake validation and parsing.

use thiserror::Error;

/// Errors returned while constructing issues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeDomainError {
    /// The external tracker identifier is empty after trimming.
    #[error("issue external identifier must not be empty")]
    EmptyExternalId,

    /// The issue title is empty after trimming.
    #[error("issue title must not be empty")]
    EmptyTitle,
}

/// Error returned while parsing issue severities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown issue severity: {0}")]
pub struct ParseSeverityError(pub String);

/// Error returned while parsing issue statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown issue status: {0}")]
pub struct ParseIssueStatusError(pub String);
