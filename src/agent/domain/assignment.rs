//! Agent-to-task assignment records.

use super::{AgentDomainError, AgentId, AssignmentId, ParseAssignmentStatusError};
use crate::board::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// The agent currently holds the task.
    Active,
    /// The task reached the terminal column.
    Completed,
    /// The task was removed before completion.
    Cancelled,
}

impl AssignmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseAssignmentStatusError(value.to_owned())),
        }
    }
}

/// How an active assignment ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentResolution {
    /// The task was finished.
    Completed,
    /// The task went away.
    Cancelled,
}

impl From<AssignmentResolution> for AssignmentStatus {
    fn from(resolution: AssignmentResolution) -> Self {
        match resolution {
            AssignmentResolution::Completed => Self::Completed,
            AssignmentResolution::Cancelled => Self::Cancelled,
        }
    }
}

/// A link between an agent and a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignment {
    id: AssignmentId,
    agent_id: AgentId,
    task_id: TaskId,
    assigned_by: String,
    assigned_at: DateTime<Utc>,
    status: AssignmentStatus,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Persisted identifier.
    pub id: AssignmentId,
    /// Persisted agent.
    pub agent_id: AgentId,
    /// Persisted task.
    pub task_id: TaskId,
    /// Persisted assigner name.
    pub assigned_by: String,
    /// Persisted assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Persisted lifecycle state.
    pub status: AssignmentStatus,
    /// Persisted resolution timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl AgentAssignment {
    /// Creates an active assignment.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyAssigner`] if `assigned_by` is blank.
    pub fn new(
        agent_id: AgentId,
        task_id: TaskId,
        assigned_by: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, AgentDomainError> {
        let raw_assigner = assigned_by.into();
        let assigner = raw_assigner.trim();
        if assigner.is_empty() {
            return Err(AgentDomainError::EmptyAssigner);
        }
        Ok(Self {
            id: AssignmentId::new(),
            agent_id,
            task_id,
            assigned_by: assigner.to_owned(),
            assigned_at: clock.utc(),
            status: AssignmentStatus::Active,
            completed_at: None,
        })
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAssignmentData) -> Self {
        Self {
            id: data.id,
            agent_id: data.agent_id,
            task_id: data.task_id,
            assigned_by: data.assigned_by,
            assigned_at: data.assigned_at,
            status: data.status,
            completed_at: data.completed_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the assigned agent.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Returns the assigned task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns who made the assignment.
    #[must_use]
    pub fn assigned_by(&self) -> &str {
        &self.assigned_by
    }

    /// Returns when the assignment was made.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> AssignmentStatus {
        self.status
    }

    /// Returns when the assignment was resolved.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the agent still holds the task.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, AssignmentStatus::Active)
    }

    /// Minutes between assignment and resolution, if resolved.
    #[must_use]
    pub fn lead_time_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|done| done.signed_duration_since(self.assigned_at).num_minutes())
    }

    /// Ends an active assignment; returns `false` if it was already resolved.
    pub fn resolve(&mut self, resolution: AssignmentResolution, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = resolution.into();
        self.completed_at = Some(at);
        true
    }
}
