//! Time entry repository over the in-memory state.

use super::InMemoryStore;
use crate::agent::domain::AgentId;
use crate::board::domain::TaskId;
use crate::timesheet::{
    domain::{TimeEntry, TimeEntryId},
    ports::{TimeEntryRepository, TimeEntryRepositoryError, TimeEntryRepositoryResult},
};
use async_trait::async_trait;

fn newest_first(mut entries: Vec<TimeEntry>) -> Vec<TimeEntry> {
    entries.sort_by(|left, right| {
        right
            .started_at()
            .cmp(&left.started_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    entries
}

#[async_trait]
impl TimeEntryRepository for InMemoryStore {
    async fn store_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(TimeEntryRepositoryError::persistence)?;
        if state.time_entries.contains_key(&entry.id()) {
            return Err(TimeEntryRepositoryError::DuplicateEntry(entry.id()));
        }
        if !state.tasks.contains_key(&entry.task_id()) {
            return Err(TimeEntryRepositoryError::TaskNotFound(entry.task_id()));
        }
        if !state.agents.contains_key(&entry.agent_id()) {
            return Err(TimeEntryRepositoryError::AgentNotFound(entry.agent_id()));
        }
        state.time_entries.insert(entry.id(), entry.clone());
        Ok(())
    }

    async fn update_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(TimeEntryRepositoryError::persistence)?;
        let stored = state
            .time_entries
            .get_mut(&entry.id())
            .ok_or(TimeEntryRepositoryError::NotFound(entry.id()))?;
        *stored = entry.clone();
        Ok(())
    }

    async fn find_entry(&self, id: TimeEntryId) -> TimeEntryRepositoryResult<Option<TimeEntry>> {
        let state = self
            .read_state()
            .map_err(TimeEntryRepositoryError::persistence)?;
        Ok(state.time_entries.get(&id).cloned())
    }

    async fn list_task_entries(
        &self,
        task_id: TaskId,
    ) -> TimeEntryRepositoryResult<Vec<TimeEntry>> {
        let state = self
            .read_state()
            .map_err(TimeEntryRepositoryError::persistence)?;
        Ok(newest_first(
            state
                .time_entries
                .values()
                .filter(|entry| entry.task_id() == task_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_agent_entries(
        &self,
        agent_id: AgentId,
    ) -> TimeEntryRepositoryResult<Vec<TimeEntry>> {
        let state = self
            .read_state()
            .map_err(TimeEntryRepositoryError::persistence)?;
        Ok(newest_first(
            state
                .time_entries
                .values()
                .filter(|entry| entry.agent_id() == agent_id)
                .cloned()
                .collect(),
        ))
    }
}
