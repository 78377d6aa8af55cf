//! Agent repository over the in-memory state.

use super::InMemoryStore;
use crate::agent::{
    domain::{Agent, AgentAssignment, AgentId, AgentStatus, AssignmentResolution},
    ports::{AgentRepository, AgentRepositoryError, AgentRepositoryResult, AssignmentFilter},
};
use crate::board::domain::TaskId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl AgentRepository for InMemoryStore {
    async fn store_agent(&self, agent: &Agent) -> AgentRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(AgentRepositoryError::persistence)?;
        if state.agents.contains_key(&agent.id()) {
            return Err(AgentRepositoryError::DuplicateAgent(agent.id()));
        }
        if state
            .agents
            .values()
            .any(|existing| existing.email() == agent.email())
        {
            return Err(AgentRepositoryError::DuplicateEmail(agent.email().to_owned()));
        }
        state.agents.insert(agent.id(), agent.clone());
        Ok(())
    }

    async fn set_status(&self, id: AgentId, status: AgentStatus) -> AgentRepositoryResult<Agent> {
        let mut state = self
            .write_state()
            .map_err(AgentRepositoryError::persistence)?;
        let agent = state
            .agents
            .get_mut(&id)
            .ok_or(AgentRepositoryError::NotFound(id))?;
        agent.set_status(status);
        Ok(agent.clone())
    }

    async fn find_agent(&self, id: AgentId) -> AgentRepositoryResult<Option<Agent>> {
        let state = self
            .read_state()
            .map_err(AgentRepositoryError::persistence)?;
        Ok(state.agents.get(&id).cloned())
    }

    async fn list_agents(&self) -> AgentRepositoryResult<Vec<Agent>> {
        let state = self
            .read_state()
            .map_err(AgentRepositoryError::persistence)?;
        let mut agents: Vec<Agent> = state.agents.values().cloned().collect();
        agents.sort_by(|left, right| {
            left.name()
                .cmp(right.name())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(agents)
    }

    async fn list_available_agents(&self) -> AgentRepositoryResult<Vec<Agent>> {
        let state = self
            .read_state()
            .map_err(AgentRepositoryError::persistence)?;
        let mut agents: Vec<Agent> = state
            .agents
            .values()
            .filter(|agent| agent.is_candidate())
            .cloned()
            .collect();
        agents.sort_by(|left, right| {
            left.current_workload()
                .cmp(&right.current_workload())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(agents)
    }

    async fn record_assignment(
        &self,
        assignment: &AgentAssignment,
    ) -> AgentRepositoryResult<Agent> {
        let mut state = self
            .write_state()
            .map_err(AgentRepositoryError::persistence)?;
        if state.assignments.contains_key(&assignment.id()) {
            return Err(AgentRepositoryError::DuplicateAssignment(assignment.id()));
        }
        if !state.tasks.contains_key(&assignment.task_id()) {
            return Err(AgentRepositoryError::TaskNotFound(assignment.task_id()));
        }
        let already_held = state.assignments.values().any(|existing| {
            existing.is_active()
                && existing.agent_id() == assignment.agent_id()
                && existing.task_id() == assignment.task_id()
        });
        if already_held {
            return Err(AgentRepositoryError::AlreadyAssigned {
                agent_id: assignment.agent_id(),
                task_id: assignment.task_id(),
            });
        }

        let agent = state
            .agents
            .get_mut(&assignment.agent_id())
            .ok_or(AgentRepositoryError::NotFound(assignment.agent_id()))?;
        if !agent.take_capacity() {
            return Err(AgentRepositoryError::AtCapacity(agent.id()));
        }
        let updated = agent.clone();
        state.assignments.insert(assignment.id(), assignment.clone());
        Ok(updated)
    }

    async fn release_task(
        &self,
        task_id: TaskId,
        resolution: AssignmentResolution,
        at: DateTime<Utc>,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>> {
        let mut state = self
            .write_state()
            .map_err(AgentRepositoryError::persistence)?;
        let mut released = Vec::new();
        for assignment in state.assignments.values_mut() {
            if assignment.task_id() == task_id && assignment.resolve(resolution, at) {
                released.push(assignment.clone());
            }
        }
        for assignment in &released {
            if let Some(agent) = state.agents.get_mut(&assignment.agent_id()) {
                agent.release_capacity();
            }
        }
        released.sort_by_key(AgentAssignment::id);
        Ok(released)
    }

    async fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>> {
        let state = self
            .read_state()
            .map_err(AgentRepositoryError::persistence)?;
        let mut assignments: Vec<AgentAssignment> = state
            .assignments
            .values()
            .filter(|assignment| filter.matches(assignment))
            .cloned()
            .collect();
        assignments.sort_by(|left, right| {
            right
                .assigned_at()
                .cmp(&left.assigned_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(assignments)
    }
}
