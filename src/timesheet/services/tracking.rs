//! Starting, stopping and summarising time entries.

use crate::agent::domain::AgentId;
use crate::board::domain::TaskId;
use crate::timesheet::{
    domain::{AgentTimeStats, TimeEntry, TimeEntryId, TimesheetDomainError},
    ports::{TimeEntryRepository, TimeEntryRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for time tracking.
#[derive(Debug, Error)]
pub enum TimeTrackingError {
    /// The state change is not allowed.
    #[error(transparent)]
    Domain(#[from] TimesheetDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TimeEntryRepositoryError),
    /// The entry does not exist.
    #[error("time entry not found: {0}")]
    EntryNotFound(TimeEntryId),
}

/// Result type for time tracking operations.
pub type TimeTrackingResult<T> = Result<T, TimeTrackingError>;

/// Time tracking orchestration service.
#[derive(Clone)]
pub struct TimeTrackingService<R, C>
where
    R: TimeEntryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TimeTrackingService<R, C>
where
    R: TimeEntryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new time tracking service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Starts a running entry for `agent_id` on `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::Repository`] when the task or agent does
    /// not exist.
    pub async fn start(
        &self,
        task_id: TaskId,
        agent_id: AgentId,
        description: Option<String>,
    ) -> TimeTrackingResult<TimeEntry> {
        let entry = TimeEntry::start(task_id, agent_id, description, &*self.clock);
        self.repository.store_entry(&entry).await?;
        info!(entry_id = %entry.id(), task_id = %task_id, agent_id = %agent_id, "started time entry");
        Ok(entry)
    }

    /// Stops a running entry, optionally replacing its note.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::EntryNotFound`] for an unknown entry or
    /// [`TimeTrackingError::Domain`] when it is already stopped.
    pub async fn stop(
        &self,
        entry_id: TimeEntryId,
        description: Option<String>,
    ) -> TimeTrackingResult<TimeEntry> {
        let mut entry = self
            .repository
            .find_entry(entry_id)
            .await?
            .ok_or(TimeTrackingError::EntryNotFound(entry_id))?;
        entry.stop(self.clock.utc(), description)?;
        self.repository.update_entry(&entry).await?;
        info!(
            entry_id = %entry_id,
            minutes = entry.duration_minutes().unwrap_or(0),
            "stopped time entry"
        );
        Ok(entry)
    }

    /// Returns a task's entries, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::Repository`] when the lookup fails.
    pub async fn task_entries(&self, task_id: TaskId) -> TimeTrackingResult<Vec<TimeEntry>> {
        Ok(self.repository.list_task_entries(task_id).await?)
    }

    /// Returns totals over an agent's stopped entries.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::Repository`] when the lookup fails.
    pub async fn agent_stats(&self, agent_id: AgentId) -> TimeTrackingResult<AgentTimeStats> {
        let entries = self.repository.list_agent_entries(agent_id).await?;
        Ok(AgentTimeStats::from_entries(&entries))
    }
}
