//! Roster management and the assignment policy.

use crate::agent::{
    domain::{
        Agent, AgentAssignment, AgentDomainError, AgentId, AgentProfile, AgentStatus,
        AssignmentResolution, selection,
    },
    ports::{AgentRepository, AgentRepositoryError, AssignmentFilter},
};
use crate::board::domain::TaskId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default name recorded for assignments made by the system.
pub const DEFAULT_SYSTEM_ASSIGNER: &str = "coordinator";

/// Result of an automatic assignment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// An agent took the task.
    Assigned {
        /// The recorded assignment.
        assignment: AgentAssignment,
        /// The agent after its workload was incremented.
        agent: Agent,
    },
    /// No agent was available with spare capacity; nothing changed.
    NoAgentAvailable,
}

impl AssignmentOutcome {
    /// Returns the assignment when one was made.
    #[must_use]
    pub const fn assignment(&self) -> Option<&AgentAssignment> {
        match self {
            Self::Assigned { assignment, .. } => Some(assignment),
            Self::NoAgentAvailable => None,
        }
    }
}

/// Request to assign a specific agent to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAssignRequest {
    agent_id: AgentId,
    task_id: TaskId,
    assigned_by: Option<String>,
}

impl ManualAssignRequest {
    /// Creates a request assigned by the system.
    #[must_use]
    pub const fn new(agent_id: AgentId, task_id: TaskId) -> Self {
        Self {
            agent_id,
            task_id,
            assigned_by: None,
        }
    }

    /// Records who made the assignment.
    #[must_use]
    pub fn assigned_by(mut self, assigner: impl Into<String>) -> Self {
        self.assigned_by = Some(assigner.into());
        self
    }
}

/// Service-level errors for assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AgentDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AgentRepositoryError),
    /// The named agent has no spare capacity.
    #[error("agent {0} has no spare capacity")]
    CapacityExhausted(AgentId),
    /// The agent does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
}

/// Result type for assignment service operations.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Agent roster and assignment orchestration service.
#[derive(Clone)]
pub struct AssignmentService<R, C>
where
    R: AgentRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    system_assigner: String,
}

impl<R, C> AssignmentService<R, C>
where
    R: AgentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service that records automatic assignments as made by
    /// [`DEFAULT_SYSTEM_ASSIGNER`].
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            system_assigner: DEFAULT_SYSTEM_ASSIGNER.to_owned(),
        }
    }

    /// Overrides the name recorded for system assignments.
    #[must_use]
    pub fn with_system_assigner(mut self, assigner: impl Into<String>) -> Self {
        self.system_assigner = assigner.into();
        self
    }

    /// Registers a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the email or identifier
    /// is already registered.
    pub async fn register_agent(&self, profile: AgentProfile) -> AssignmentResult<Agent> {
        let agent = Agent::new(profile, &*self.clock);
        self.repository.store_agent(&agent).await?;
        info!(agent_id = %agent.id(), name = agent.name(), "registered agent");
        Ok(agent)
    }

    /// Changes an agent's availability.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] for an unknown agent.
    pub async fn set_status(
        &self,
        agent_id: AgentId,
        status: AgentStatus,
    ) -> AssignmentResult<Agent> {
        let agent = self.repository.set_status(agent_id, status).await?;
        debug!(agent_id = %agent_id, status = %status, "changed agent status");
        Ok(agent)
    }

    /// Finds an agent by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the lookup fails.
    pub async fn find_agent(&self, agent_id: AgentId) -> AssignmentResult<Option<Agent>> {
        Ok(self.repository.find_agent(agent_id).await?)
    }

    /// Returns every agent ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the lookup fails.
    pub async fn list_agents(&self) -> AssignmentResult<Vec<Agent>> {
        Ok(self.repository.list_agents().await?)
    }

    /// Returns agents that automatic assignment may pick, in preference
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the lookup fails.
    pub async fn list_available_agents(&self) -> AssignmentResult<Vec<Agent>> {
        let agents = self.repository.list_available_agents().await?;
        Ok(selection::rank_candidates(&agents)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Assigns the least-loaded available agent to a task.
    ///
    /// Candidates are tried in preference order; one that fills up between
    /// the read and the write is skipped in favour of the next.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the task does not exist
    /// or persistence fails. An empty candidate set is
    /// [`AssignmentOutcome::NoAgentAvailable`], not an error.
    pub async fn auto_assign(&self, task_id: TaskId) -> AssignmentResult<AssignmentOutcome> {
        let agents = self.repository.list_available_agents().await?;
        for candidate in selection::rank_candidates(&agents) {
            let assignment = AgentAssignment::new(
                candidate.id(),
                task_id,
                self.system_assigner.as_str(),
                &*self.clock,
            )?;
            match self.repository.record_assignment(&assignment).await {
                Ok(agent) => {
                    info!(
                        task_id = %task_id,
                        agent_id = %agent.id(),
                        workload = agent.current_workload(),
                        "auto-assigned task"
                    );
                    return Ok(AssignmentOutcome::Assigned { assignment, agent });
                }
                Err(
                    AgentRepositoryError::AtCapacity(agent_id)
                    | AgentRepositoryError::NotFound(agent_id),
                ) => {
                    warn!(task_id = %task_id, agent_id = %agent_id, "candidate lost capacity");
                }
                Err(AgentRepositoryError::AlreadyAssigned { agent_id, .. }) => {
                    debug!(task_id = %task_id, agent_id = %agent_id, "candidate already holds task");
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(task_id = %task_id, "no agent available for task");
        Ok(AssignmentOutcome::NoAgentAvailable)
    }

    /// Assigns a named agent to a task under the same capacity rule.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::CapacityExhausted`] when the agent is
    /// full, [`AssignmentError::AgentNotFound`] for an unknown agent, or
    /// [`AssignmentError::Repository`] for other persistence failures.
    pub async fn assign(&self, request: ManualAssignRequest) -> AssignmentResult<AgentAssignment> {
        let assigner = request
            .assigned_by
            .unwrap_or_else(|| self.system_assigner.clone());
        let assignment =
            AgentAssignment::new(request.agent_id, request.task_id, assigner, &*self.clock)?;
        match self.repository.record_assignment(&assignment).await {
            Ok(agent) => {
                info!(
                    task_id = %request.task_id,
                    agent_id = %agent.id(),
                    assigned_by = assignment.assigned_by(),
                    "assigned task"
                );
                Ok(assignment)
            }
            Err(AgentRepositoryError::AtCapacity(agent_id)) => {
                Err(AssignmentError::CapacityExhausted(agent_id))
            }
            Err(AgentRepositoryError::NotFound(agent_id)) => {
                Err(AssignmentError::AgentNotFound(agent_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a task's active assignments and frees the agents' capacity.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the transaction fails.
    pub async fn release_task(
        &self,
        task_id: TaskId,
        resolution: AssignmentResolution,
    ) -> AssignmentResult<Vec<AgentAssignment>> {
        let released = self
            .repository
            .release_task(task_id, resolution, self.clock.utc())
            .await?;
        if !released.is_empty() {
            info!(
                task_id = %task_id,
                released = released.len(),
                ?resolution,
                "released task assignments"
            );
        }
        Ok(released)
    }

    /// Returns assignments matching `filter`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Repository`] when the lookup fails.
    pub async fn assignments(
        &self,
        filter: AssignmentFilter,
    ) -> AssignmentResult<Vec<AgentAssignment>> {
        Ok(self.repository.list_assignments(filter).await?)
    }
}
