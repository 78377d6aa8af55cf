//! Repository port for columns, tasks and file diffs.

use crate::board::domain::{Column, ColumnId, FileDiff, Position, PositionUpdate, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Board persistence contract.
///
/// Every mutating method is one atomic unit: either all of its rows change
/// or none do.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateColumn`] when the identifier
    /// exists or [`BoardRepositoryError::ColumnPositionConflict`] when the
    /// column is not appended after the current last column.
    async fn store_column(&self, column: &Column) -> BoardRepositoryResult<()>;

    /// Finds a column by identifier.
    async fn find_column(&self, id: ColumnId) -> BoardRepositoryResult<Option<Column>>;

    /// Returns every column ordered by position.
    async fn list_columns(&self) -> BoardRepositoryResult<Vec<Column>>;

    /// Stores a new task at the tail of its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ColumnNotFound`] for an unknown
    /// column, [`BoardRepositoryError::DuplicateTask`] for a reused
    /// identifier, or [`BoardRepositoryError::PositionConflict`] when the
    /// task position no longer equals the column's task count.
    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Persists the editable fields of an existing task.
    ///
    /// Column and position are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Returns every task ordered by column, then position.
    async fn list_tasks(&self) -> BoardRepositoryResult<Vec<Task>>;

    /// Returns the tasks of one column ordered by position.
    async fn list_column_tasks(&self, column_id: ColumnId) -> BoardRepositoryResult<Vec<Task>>;

    /// Applies a reconciled batch of placements in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when any row is missing;
    /// no row of the batch is changed in that case.
    async fn apply_positions(
        &self,
        updates: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<()>;

    /// Deletes a task and compacts its column in one transaction.
    ///
    /// The task's file diffs and time entries are removed with it. Its
    /// active assignments become cancelled with `completed_at` set and their
    /// agents get that capacity back; resolved assignments are kept as
    /// history. Returns the number of active assignments cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when the task or any row of
    /// the compaction batch is missing.
    async fn delete_task(
        &self,
        id: TaskId,
        compaction: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<usize>;

    /// Appends a file diff to a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn append_file_diff(&self, diff: &FileDiff) -> BoardRepositoryResult<()>;

    /// Returns the file diffs of a task, newest first.
    async fn list_file_diffs(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<FileDiff>>;
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// A column with the same identifier already exists.
    #[error("duplicate column identifier: {0}")]
    DuplicateColumn(ColumnId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The referenced column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A new column was not appended at the end of the board.
    #[error("column position {requested} conflicts with board length {expected}")]
    ColumnPositionConflict {
        /// Position the column asked for.
        requested: Position,
        /// Position an appended column must take.
        expected: Position,
    },

    /// A new task was not appended at the tail of its column.
    #[error("task position {requested} in column {column_id} conflicts with tail {expected}")]
    PositionConflict {
        /// Column receiving the task.
        column_id: ColumnId,
        /// Position the task asked for.
        requested: Position,
        /// Position an appended task must take.
        expected: Position,
    },

    /// Persistence-layer failure; the whole operation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
