//! Service layer for column and task mutations.
//!
//! Every mutation reads the rows it needs, runs the position reconciler on
//! that snapshot and hands the resulting batch to the repository as one
//! atomic operation.

use crate::board::{
    domain::{
        BoardDomainError, Column, ColumnId, FileDiff, MovePlan, Position, Task, TaskDraft,
        TaskId, TaskPatch, position,
    },
    ports::{BoardRepository, BoardRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request to move a task to a position within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTaskRequest {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column; may equal the current column.
    pub column_id: ColumnId,
    /// Requested position, clamped to the destination length.
    pub position: Position,
}

impl MoveTaskRequest {
    /// Creates a move request.
    #[must_use]
    pub const fn new(task_id: TaskId, column_id: ColumnId, position: Position) -> Self {
        Self {
            task_id,
            column_id,
            position,
        }
    }
}

/// Request payload for recording a file diff against a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFileDiffRequest {
    task_id: TaskId,
    file_path: String,
    old_content: Option<String>,
    new_content: Option<String>,
    diff_content: Option<String>,
}

impl RecordFileDiffRequest {
    /// Creates a request for `file_path` on `task_id`.
    #[must_use]
    pub fn new(task_id: TaskId, file_path: impl Into<String>) -> Self {
        Self {
            task_id,
            file_path: file_path.into(),
            old_content: None,
            new_content: None,
            diff_content: None,
        }
    }

    /// Sets the content before the change.
    #[must_use]
    pub fn with_old_content(mut self, content: impl Into<String>) -> Self {
        self.old_content = Some(content.into());
        self
    }

    /// Sets the content after the change.
    #[must_use]
    pub fn with_new_content(mut self, content: impl Into<String>) -> Self {
        self.new_content = Some(content.into());
        self
    }

    /// Sets the unified diff text.
    #[must_use]
    pub fn with_diff_content(mut self, content: impl Into<String>) -> Self {
        self.diff_content = Some(content.into());
        self
    }
}

/// A task together with its recorded file diffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    /// The task.
    pub task: Task,
    /// File diffs, newest first.
    pub file_diffs: Vec<FileDiff>,
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Board orchestration service.
#[derive(Clone)]
pub struct BoardService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> BoardService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Appends a column to the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] for a blank title or
    /// [`BoardServiceError::Repository`] when persistence fails.
    pub async fn create_column(
        &self,
        title: impl Into<String> + Send,
        color: impl Into<String> + Send,
    ) -> BoardServiceResult<Column> {
        let existing = self.repository.list_columns().await?;
        let column_position = position::append_position(existing.len())?;
        let column = Column::new(title, color, column_position, &*self.clock)?;
        self.repository.store_column(&column).await?;
        info!(column_id = %column.id(), title = column.title(), "created column");
        Ok(column)
    }

    /// Returns every column ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the lookup fails.
    pub async fn list_columns(&self) -> BoardServiceResult<Vec<Column>> {
        Ok(self.repository.list_columns().await?)
    }

    /// Appends a task to the tail of `column_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ColumnNotFound`] for an unknown column or
    /// [`BoardServiceError::Repository`] when the store rejects the insert,
    /// for example with a position conflict after a concurrent append.
    pub async fn create_task(
        &self,
        column_id: ColumnId,
        draft: TaskDraft,
    ) -> BoardServiceResult<Task> {
        self.require_column(column_id).await?;
        let members = self.repository.list_column_tasks(column_id).await?;
        let tail = position::append_position(members.len())?;
        let task = Task::new(draft, column_id, tail, &*self.clock);
        self.repository.store_task(&task).await?;
        info!(
            task_id = %task.id(),
            column_id = %column_id,
            position = %tail,
            "created task"
        );
        Ok(task)
    }

    /// Applies a typed patch to a task's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] for an unknown task or
    /// [`BoardServiceError::Domain`] when the patch is invalid.
    pub async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> BoardServiceResult<Task> {
        let mut task = self.require_task(task_id).await?;
        if patch.is_empty() {
            return Ok(task);
        }
        task.apply_patch(patch, &*self.clock)?;
        self.repository.update_task(&task).await?;
        debug!(task_id = %task_id, "updated task fields");
        Ok(task)
    }

    /// Moves a task within or across columns, keeping both columns dense.
    ///
    /// Nothing is written when the move changes no placement.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] or
    /// [`BoardServiceError::ColumnNotFound`] before any write, or
    /// [`BoardServiceError::Repository`] when the batch is rolled back.
    pub async fn move_task(&self, request: MoveTaskRequest) -> BoardServiceResult<MovePlan> {
        let task = self.require_task(request.task_id).await?;
        self.require_column(request.column_id).await?;

        let mut snapshot = self.repository.list_column_tasks(task.column_id()).await?;
        if task.column_id() != request.column_id {
            snapshot.extend(self.repository.list_column_tasks(request.column_id).await?);
        }
        if snapshot.iter().all(|member| member.id() != task.id()) {
            snapshot.push(task);
        }

        let plan = position::plan_move(
            &snapshot,
            request.task_id,
            request.column_id,
            request.position,
        )?;
        if plan.is_noop() {
            debug!(task_id = %request.task_id, "move changes no placement");
            return Ok(plan);
        }

        self.repository
            .apply_positions(plan.updates(), self.clock.utc())
            .await?;
        info!(
            task_id = %request.task_id,
            from_column = %plan.from_column(),
            to_column = %plan.to_column(),
            position = %plan.final_position(),
            rows = plan.updates().len(),
            "moved task"
        );
        Ok(plan)
    }

    /// Deletes a task and compacts its column.
    ///
    /// Returns the number of active assignments released with the task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] for an unknown task or
    /// [`BoardServiceError::Repository`] when the deletion is rolled back.
    pub async fn delete_task(&self, task_id: TaskId) -> BoardServiceResult<usize> {
        let task = self.require_task(task_id).await?;
        let mut members = self.repository.list_column_tasks(task.column_id()).await?;
        if members.iter().all(|member| member.id() != task_id) {
            members.push(task);
        }
        let compaction = position::plan_removal(&members, task_id)?;
        let released = self
            .repository
            .delete_task(task_id, &compaction, self.clock.utc())
            .await?;
        info!(
            task_id = %task_id,
            compacted = compaction.len(),
            released,
            "deleted task"
        );
        Ok(released)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> BoardServiceResult<Option<Task>> {
        Ok(self.repository.find_task(task_id).await?)
    }

    /// Returns every task ordered by column, then position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the lookup fails.
    pub async fn list_tasks(&self) -> BoardServiceResult<Vec<Task>> {
        Ok(self.repository.list_tasks().await?)
    }

    /// Returns a task together with its file diffs.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] for an unknown task.
    pub async fn task_details(&self, task_id: TaskId) -> BoardServiceResult<TaskDetails> {
        let task = self.require_task(task_id).await?;
        let file_diffs = self.repository.list_file_diffs(task_id).await?;
        Ok(TaskDetails { task, file_diffs })
    }

    /// Records a file diff against a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] for a blank path or
    /// [`BoardServiceError::TaskNotFound`] for an unknown task.
    pub async fn record_file_diff(
        &self,
        request: RecordFileDiffRequest,
    ) -> BoardServiceResult<FileDiff> {
        self.require_task(request.task_id).await?;
        let mut diff = FileDiff::new(request.task_id, request.file_path, &*self.clock)?;
        if let Some(content) = request.old_content {
            diff = diff.with_old_content(content);
        }
        if let Some(content) = request.new_content {
            diff = diff.with_new_content(content);
        }
        if let Some(content) = request.diff_content {
            diff = diff.with_diff_content(content);
        }
        self.repository.append_file_diff(&diff).await?;
        debug!(task_id = %diff.task_id(), path = diff.file_path(), "recorded file diff");
        Ok(diff)
    }

    /// Returns the file diffs of a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the lookup fails.
    pub async fn file_diffs(&self, task_id: TaskId) -> BoardServiceResult<Vec<FileDiff>> {
        Ok(self.repository.list_file_diffs(task_id).await?)
    }

    async fn require_task(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        self.repository
            .find_task(task_id)
            .await?
            .ok_or(BoardServiceError::TaskNotFound(task_id))
    }

    async fn require_column(&self, column_id: ColumnId) -> BoardServiceResult<Column> {
        self.repository
            .find_column(column_id)
            .await?
            .ok_or(BoardServiceError::ColumnNotFound(column_id))
    }
}
