//! Time entries recorded by agents against tasks.

use crate::agent::domain::AgentId;
use crate::board::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeEntryId(Uuid);

impl TimeEntryId {
    /// Creates a new random time entry identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a time entry identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TimeEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimeEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned by time entry state changes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimesheetDomainError {
    /// The entry has already been stopped.
    #[error("time entry {0} is already stopped")]
    AlreadyStopped(TimeEntryId),

    /// The stop time precedes the start time.
    #[error("time entry {0} cannot end before it starts")]
    EndsBeforeStart(TimeEntryId),
}

/// A span of work by one agent on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    id: TimeEntryId,
    task_id: TaskId,
    agent_id: AgentId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_minutes: Option<u32>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTimeEntryData {
    /// Persisted identifier.
    pub id: TimeEntryId,
    /// Persisted task.
    pub task_id: TaskId,
    /// Persisted agent.
    pub agent_id: AgentId,
    /// Persisted start timestamp.
    pub started_at: DateTime<Utc>,
    /// Persisted end timestamp.
    pub ended_at: Option<DateTime<Utc>>,
    /// Persisted whole-minute duration.
    pub duration_minutes: Option<u32>,
    /// Persisted note.
    pub description: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Starts a running entry now.
    #[must_use]
    pub fn start(
        task_id: TaskId,
        agent_id: AgentId,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        Self {
            id: TimeEntryId::new(),
            task_id,
            agent_id,
            started_at: now,
            ended_at: None,
            duration_minutes: None,
            description: description.filter(|note| !note.trim().is_empty()),
            created_at: now,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTimeEntryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            agent_id: data.agent_id,
            started_at: data.started_at,
            ended_at: data.ended_at,
            duration_minutes: data.duration_minutes,
            description: data.description,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TimeEntryId {
        self.id
    }

    /// Returns the task worked on.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the agent who worked.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Returns when work started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when work stopped.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns the whole minutes worked, once stopped.
    #[must_use]
    pub const fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Returns the note.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the entry is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Stops the entry at `at`, recording whole minutes elapsed.
    ///
    /// A non-blank `description` replaces the note.
    ///
    /// # Errors
    ///
    /// Returns [`TimesheetDomainError::AlreadyStopped`] for a stopped entry
    /// or [`TimesheetDomainError::EndsBeforeStart`] when `at` precedes the
    /// start.
    pub fn stop(
        &mut self,
        at: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<(), TimesheetDomainError> {
        if !self.is_running() {
            return Err(TimesheetDomainError::AlreadyStopped(self.id));
        }
        let minutes = at.signed_duration_since(self.started_at).num_minutes();
        let duration =
            u32::try_from(minutes).map_err(|_| TimesheetDomainError::EndsBeforeStart(self.id))?;
        self.ended_at = Some(at);
        self.duration_minutes = Some(duration);
        if let Some(note) = description.filter(|note| !note.trim().is_empty()) {
            self.description = Some(note);
        }
        Ok(())
    }
}
