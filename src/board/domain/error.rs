//! Error types for board domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or reconciling board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The column title is empty after trimming.
    #[error("column title must not be empty")]
    EmptyColumnTitle,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The file path of a diff is empty after trimming.
    #[error("file diff path must not be empty")]
    EmptyFilePath,

    /// An ordinal does not fit the persisted position range.
    #[error("position {0} exceeds the supported range")]
    PositionOutOfRange(usize),

    /// A reconciliation was requested for a task missing from the snapshot.
    #[error("task {0} is not part of the reconciliation snapshot")]
    TaskNotInSnapshot(TaskId),
}

/// Error returned while parsing task priorities from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
