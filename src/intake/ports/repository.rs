//! Repository port for ingested issues and their conversion.

use crate::board::{
    domain::{Task, TaskId},
    ports::BoardRepositoryError,
};
use crate::intake::domain::{Issue, IssueId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue repository operations.
pub type IssueRepositoryResult<T> = Result<T, IssueRepositoryError>;

/// Issue persistence contract.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Stores a newly ingested issue.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::DuplicateIssue`] for a reused
    /// identifier or [`IssueRepositoryError::DuplicateExternalId`] when the
    /// tracker identifier was already ingested.
    async fn store_issue(&self, issue: &Issue) -> IssueRepositoryResult<()>;

    /// Finds an issue by identifier.
    async fn find_issue(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>>;

    /// Finds an issue by its external tracker identifier.
    async fn find_by_external_id(&self, external_id: &str)
    -> IssueRepositoryResult<Option<Issue>>;

    /// Returns every issue, most recently reported first.
    async fn list_issues(&self) -> IssueRepositoryResult<Vec<Issue>>;

    /// Flags or unflags an issue for the board and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::NotFound`] for an unknown issue.
    async fn set_selection(
        &self,
        id: IssueId,
        selected: bool,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue>;

    /// Stores `task` and links the issue to it in one transaction, returning
    /// the linked issue.
    ///
    /// The conversion state is re-checked inside the transaction, so two
    /// concurrent conversions of one issue produce a single task.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::NotFound`] for an unknown issue,
    /// [`IssueRepositoryError::AlreadyConverted`] when the issue is already
    /// linked, or [`IssueRepositoryError::Board`] when the task insert is
    /// rejected. Nothing is written in any of these cases.
    async fn convert_issue(
        &self,
        id: IssueId,
        task: &Task,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue>;
}

/// Errors returned by issue repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IssueRepositoryError {
    /// An issue with the same identifier already exists.
    #[error("duplicate issue identifier: {0}")]
    DuplicateIssue(IssueId),

    /// An issue with the same external identifier already exists.
    #[error("duplicate external issue identifier: {0}")]
    DuplicateExternalId(String),

    /// The issue does not exist.
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// The issue is already linked to a task.
    #[error("issue {issue_id} already converted to task {task_id}")]
    AlreadyConverted {
        /// The converted issue.
        issue_id: IssueId,
        /// The task it is linked to.
        task_id: TaskId,
    },

    /// The task insert was rejected by the board store.
    #[error(transparent)]
    Board(#[from] BoardRepositoryError),

    /// Persistence-layer failure; the whole operation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
