//! Repository port for time entries.

use crate::agent::domain::AgentId;
use crate::board::domain::TaskId;
use crate::timesheet::domain::{TimeEntry, TimeEntryId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for time entry repository operations.
pub type TimeEntryRepositoryResult<T> = Result<T, TimeEntryRepositoryError>;

/// Time entry persistence contract.
#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Stores a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`TimeEntryRepositoryError::TaskNotFound`] or
    /// [`TimeEntryRepositoryError::AgentNotFound`] for unknown references,
    /// or [`TimeEntryRepositoryError::DuplicateEntry`] for a reused
    /// identifier.
    async fn store_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()>;

    /// Persists the end, duration and note of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`TimeEntryRepositoryError::NotFound`] for an unknown entry.
    async fn update_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()>;

    /// Finds an entry by identifier.
    async fn find_entry(&self, id: TimeEntryId) -> TimeEntryRepositoryResult<Option<TimeEntry>>;

    /// Returns the entries of a task, most recently started first.
    async fn list_task_entries(&self, task_id: TaskId)
    -> TimeEntryRepositoryResult<Vec<TimeEntry>>;

    /// Returns the entries of an agent, most recently started first.
    async fn list_agent_entries(
        &self,
        agent_id: AgentId,
    ) -> TimeEntryRepositoryResult<Vec<TimeEntry>>;
}

/// Errors returned by time entry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TimeEntryRepositoryError {
    /// An entry with the same identifier already exists.
    #[error("duplicate time entry identifier: {0}")]
    DuplicateEntry(TimeEntryId),

    /// The entry does not exist.
    #[error("time entry not found: {0}")]
    NotFound(TimeEntryId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The agent does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TimeEntryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
