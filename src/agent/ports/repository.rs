//! Repository port for the agent roster and assignment ledger.

use crate::agent::domain::{
    Agent, AgentAssignment, AgentId, AgentStatus, AssignmentId, AssignmentResolution,
    AssignmentStatus,
};
use crate::board::domain::TaskId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent repository operations.
pub type AgentRepositoryResult<T> = Result<T, AgentRepositoryError>;

/// Criteria for listing assignments. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    /// Restrict to one agent.
    pub agent_id: Option<AgentId>,
    /// Restrict to one task.
    pub task_id: Option<TaskId>,
    /// Restrict to one lifecycle state.
    pub status: Option<AssignmentStatus>,
}

impl AssignmentFilter {
    /// Matches every assignment.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            agent_id: None,
            task_id: None,
            status: None,
        }
    }

    /// Restricts to one agent.
    #[must_use]
    pub const fn for_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    /// Restricts to one task.
    #[must_use]
    pub const fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Restricts to one lifecycle state.
    #[must_use]
    pub const fn with_status(mut self, status: AssignmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns whether `assignment` satisfies the filter.
    #[must_use]
    pub fn matches(&self, assignment: &AgentAssignment) -> bool {
        self.agent_id.is_none_or(|id| assignment.agent_id() == id)
            && self.task_id.is_none_or(|id| assignment.task_id() == id)
            && self.status.is_none_or(|status| assignment.status() == status)
    }
}

/// Agent persistence contract.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Registers a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentRepositoryError::DuplicateAgent`] for a reused
    /// identifier or [`AgentRepositoryError::DuplicateEmail`] for a reused
    /// email.
    async fn store_agent(&self, agent: &Agent) -> AgentRepositoryResult<()>;

    /// Changes an agent's availability and returns the updated agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentRepositoryError::NotFound`] for an unknown agent.
    async fn set_status(&self, id: AgentId, status: AgentStatus) -> AgentRepositoryResult<Agent>;

    /// Finds an agent by identifier.
    async fn find_agent(&self, id: AgentId) -> AgentRepositoryResult<Option<Agent>>;

    /// Returns every agent ordered by name.
    async fn list_agents(&self) -> AgentRepositoryResult<Vec<Agent>>;

    /// Returns available agents with spare capacity, ordered by workload
    /// ascending, then identifier.
    async fn list_available_agents(&self) -> AgentRepositoryResult<Vec<Agent>>;

    /// Records an active assignment and takes one unit of the agent's
    /// capacity in one transaction. Returns the agent after the increment.
    ///
    /// Capacity is re-checked inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AgentRepositoryError::AtCapacity`] when the agent is full,
    /// [`AgentRepositoryError::NotFound`] or
    /// [`AgentRepositoryError::TaskNotFound`] for unknown references,
    /// [`AgentRepositoryError::AlreadyAssigned`] when the agent already holds
    /// the task, or [`AgentRepositoryError::DuplicateAssignment`] for a
    /// reused identifier.
    async fn record_assignment(&self, assignment: &AgentAssignment)
    -> AgentRepositoryResult<Agent>;

    /// Resolves every active assignment of a task and returns the capacity
    /// to each agent, in one transaction.
    ///
    /// Returns the assignments that were resolved; an empty list when the
    /// task had none, which makes the call idempotent.
    async fn release_task(
        &self,
        task_id: TaskId,
        resolution: AssignmentResolution,
        at: DateTime<Utc>,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>>;

    /// Returns assignments matching `filter`, most recent first.
    async fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>>;
}

/// Errors returned by agent repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AgentRepositoryError {
    /// An agent with the same identifier already exists.
    #[error("duplicate agent identifier: {0}")]
    DuplicateAgent(AgentId),

    /// An agent with the same email already exists.
    #[error("duplicate agent email: {0}")]
    DuplicateEmail(String),

    /// An assignment with the same identifier already exists.
    #[error("duplicate assignment identifier: {0}")]
    DuplicateAssignment(AssignmentId),

    /// The agent does not exist.
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The agent has no spare capacity.
    #[error("agent {0} is at capacity")]
    AtCapacity(AgentId),

    /// The agent already holds an active assignment for the task.
    #[error("agent {agent_id} already holds task {task_id}")]
    AlreadyAssigned {
        /// Agent holding the task.
        agent_id: AgentId,
        /// Task already held.
        task_id: TaskId,
    },

    /// Persistence-layer failure; the whole operation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
