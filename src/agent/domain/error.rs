//! Error types for agent domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing agents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyName,

    /// The email address is not of the form `local@domain`.
    #[error("invalid agent email: {0}")]
    InvalidEmail(String),

    /// The agent role is empty after trimming.
    #[error("agent role must not be empty")]
    EmptyRole,

    /// The assigner name is empty after trimming.
    #[error("assignment must name who assigned it")]
    EmptyAssigner,
}

/// Error returned while parsing agent availability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown agent status: {0}")]
pub struct ParseAgentStatusError(pub String);

/// Error returned while parsing assignment states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);
