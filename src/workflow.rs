//! Board workflow tying task lifecycle to agent capacity.
//!
//! [`KanbanWorkflow`] wires the board, assignment and intake services over a
//! single store. Moving a task into the terminal column completes its active
//! assignments and hands the capacity back to the agents; deleting a task
//! cancels them.

use crate::agent::{
    domain::{AgentAssignment, AssignmentResolution},
    ports::AgentRepository,
    services::{AssignmentError, AssignmentOutcome, AssignmentService},
};
use crate::board::{
    domain::{Column, ColumnId, MovePlan, Task, TaskDraft, TaskId},
    ports::BoardRepository,
    services::{BoardService, BoardServiceError, MoveTaskRequest},
};
use crate::config::BoardConfig;
use crate::intake::{
    domain::IssueId,
    ports::IssueRepository,
    services::{ConversionReport, IntakeServiceError, IssueIntakeService},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Board operation failed.
    #[error(transparent)]
    Board(#[from] BoardServiceError),
    /// Assignment operation failed.
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    /// Issue conversion failed.
    #[error(transparent)]
    Intake(#[from] IntakeServiceError),
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// A created task and, when requested, its auto-assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    /// The new task.
    pub task: Task,
    /// Auto-assignment result; `None` when not requested.
    pub assignment: Option<AssignmentOutcome>,
}

/// A completed move and the assignments it released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedTask {
    /// The applied plan.
    pub plan: MovePlan,
    /// Assignments completed because the task entered the terminal column.
    pub released: Vec<AgentAssignment>,
}

/// Store-backed board workflow.
pub struct KanbanWorkflow<S, C>
where
    S: BoardRepository + AgentRepository + IssueRepository,
    C: Clock + Send + Sync,
{
    board: BoardService<S, C>,
    assignments: AssignmentService<S, C>,
    intake: IssueIntakeService<S, S, S, C>,
    config: Arc<BoardConfig>,
}

impl<S, C> KanbanWorkflow<S, C>
where
    S: BoardRepository + AgentRepository + IssueRepository,
    C: Clock + Send + Sync,
{
    /// Wires the services over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, config: Arc<BoardConfig>) -> Self {
        let assignments = AssignmentService::new(Arc::clone(&store), Arc::clone(&clock))
            .with_system_assigner(config.system_assigner.as_str());
        let intake = IssueIntakeService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            AssignmentService::new(Arc::clone(&store), Arc::clone(&clock))
                .with_system_assigner(config.system_assigner.as_str()),
            Arc::clone(&clock),
        )
        .with_config(Arc::clone(&config));
        Self {
            board: BoardService::new(store, clock),
            assignments,
            intake,
            config,
        }
    }

    /// Returns the board service.
    #[must_use]
    pub const fn board(&self) -> &BoardService<S, C> {
        &self.board
    }

    /// Returns the assignment service.
    #[must_use]
    pub const fn assignments(&self) -> &AssignmentService<S, C> {
        &self.assignments
    }

    /// Returns the intake service.
    #[must_use]
    pub const fn intake(&self) -> &IssueIntakeService<S, S, S, C> {
        &self.intake
    }

    /// Appends a task and optionally auto-assigns it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when creation or assignment fails.
    pub async fn create_task(
        &self,
        column_id: ColumnId,
        draft: TaskDraft,
        auto_assign: bool,
    ) -> WorkflowResult<CreatedTask> {
        let task = self.board.create_task(column_id, draft).await?;
        let assignment = if auto_assign {
            Some(self.assignments.auto_assign(task.id()).await?)
        } else {
            None
        };
        Ok(CreatedTask { task, assignment })
    }

    /// Moves a task; entering the terminal column completes its active
    /// assignments.
    ///
    /// The release runs after the move commits. It is idempotent, so a
    /// retried move releases nothing twice.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the move or the release fails.
    pub async fn move_task(&self, request: MoveTaskRequest) -> WorkflowResult<MovedTask> {
        let plan = self.board.move_task(request).await?;
        let mut released = Vec::new();
        if plan.crosses_columns() {
            let columns = self.board.list_columns().await?;
            let terminal = self.config.resolve_terminal(&columns).map(Column::id);
            if terminal == Some(plan.to_column()) {
                released = self
                    .assignments
                    .release_task(plan.task_id(), AssignmentResolution::Completed)
                    .await?;
                info!(
                    task_id = %plan.task_id(),
                    released = released.len(),
                    "task completed"
                );
            }
        }
        Ok(MovedTask { plan, released })
    }

    /// Deletes a task, cancelling its active assignments.
    ///
    /// Returns the number of assignments cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Board`] when the task does not exist or the
    /// deletion is rolled back.
    pub async fn delete_task(&self, task_id: TaskId) -> WorkflowResult<usize> {
        Ok(self.board.delete_task(task_id).await?)
    }

    /// Converts issues into tasks in the intake column.
    ///
    /// # Errors
    ///
    /// See [`IssueIntakeService::convert`].
    pub async fn convert_issues(&self, ids: &[IssueId]) -> WorkflowResult<ConversionReport> {
        Ok(self.intake.convert(ids).await?)
    }
}
