//! Board repository over the in-memory state.

use super::{InMemoryStore, StoreState};
use crate::agent::domain::AssignmentResolution;
use crate::board::{
    domain::{Column, ColumnId, FileDiff, Position, PositionUpdate, Task, TaskId, position},
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Inserts a task at the tail of its column, shared with issue conversion.
pub(super) fn insert_task(state: &mut StoreState, task: &Task) -> BoardRepositoryResult<()> {
    if state.tasks.contains_key(&task.id()) {
        return Err(BoardRepositoryError::DuplicateTask(task.id()));
    }
    if !state.columns.contains_key(&task.column_id()) {
        return Err(BoardRepositoryError::ColumnNotFound(task.column_id()));
    }
    let tail = Position::from_index(state.column_len(task.column_id()))
        .map_err(BoardRepositoryError::persistence)?;
    if task.position() != tail {
        return Err(BoardRepositoryError::PositionConflict {
            column_id: task.column_id(),
            requested: task.position(),
            expected: tail,
        });
    }
    state.tasks.insert(task.id(), task.clone());
    Ok(())
}

fn check_batch(state: &StoreState, updates: &[PositionUpdate]) -> BoardRepositoryResult<()> {
    for update in updates {
        if !state.tasks.contains_key(&update.task_id) {
            return Err(BoardRepositoryError::NotFound(update.task_id));
        }
        if !state.columns.contains_key(&update.column_id) {
            return Err(BoardRepositoryError::ColumnNotFound(update.column_id));
        }
    }
    Ok(())
}

fn apply_batch(state: &mut StoreState, updates: &[PositionUpdate], at: DateTime<Utc>) {
    for update in updates {
        if let Some(task) = state.tasks.get_mut(&update.task_id) {
            task.reposition(update.column_id, update.position, at);
        }
    }
}

fn sorted_tasks<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks.cloned().collect();
    selected.sort_by(position::display_order);
    selected
}

#[async_trait]
impl BoardRepository for InMemoryStore {
    async fn store_column(&self, column: &Column) -> BoardRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        if state.columns.contains_key(&column.id()) {
            return Err(BoardRepositoryError::DuplicateColumn(column.id()));
        }
        let expected = Position::from_index(state.columns.len())
            .map_err(BoardRepositoryError::persistence)?;
        if column.position() != expected {
            return Err(BoardRepositoryError::ColumnPositionConflict {
                requested: column.position(),
                expected,
            });
        }
        state.columns.insert(column.id(), column.clone());
        Ok(())
    }

    async fn find_column(&self, id: ColumnId) -> BoardRepositoryResult<Option<Column>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        Ok(state.columns.get(&id).cloned())
    }

    async fn list_columns(&self) -> BoardRepositoryResult<Vec<Column>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        let mut columns: Vec<Column> = state.columns.values().cloned().collect();
        columns.sort_by_key(Column::position);
        Ok(columns)
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        insert_task(&mut state, task)
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(BoardRepositoryError::NotFound(task.id()))?;
        let mut updated = task.clone();
        updated.reposition(stored.column_id(), stored.position(), task.updated_at());
        *stored = updated;
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self) -> BoardRepositoryResult<Vec<Task>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by(|left, right| {
            let left_column = state.columns.get(&left.column_id()).map(Column::position);
            let right_column = state.columns.get(&right.column_id()).map(Column::position);
            left_column
                .cmp(&right_column)
                .then_with(|| position::display_order(left, right))
        });
        Ok(tasks)
    }

    async fn list_column_tasks(&self, column_id: ColumnId) -> BoardRepositoryResult<Vec<Task>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        Ok(sorted_tasks(
            state
                .tasks
                .values()
                .filter(|task| task.column_id() == column_id),
        ))
    }

    async fn apply_positions(
        &self,
        updates: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        check_batch(&state, updates)?;
        apply_batch(&mut state, updates, at);
        Ok(())
    }

    async fn delete_task(
        &self,
        id: TaskId,
        compaction: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<usize> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        if !state.tasks.contains_key(&id) {
            return Err(BoardRepositoryError::NotFound(id));
        }
        let remaining: Vec<PositionUpdate> = compaction
            .iter()
            .filter(|update| update.task_id != id)
            .copied()
            .collect();
        check_batch(&state, &remaining)?;

        let mut holders = Vec::new();
        for assignment in state.assignments.values_mut() {
            if assignment.task_id() == id
                && assignment.resolve(AssignmentResolution::Cancelled, at)
            {
                holders.push(assignment.agent_id());
            }
        }
        for agent_id in &holders {
            if let Some(agent) = state.agents.get_mut(agent_id) {
                agent.release_capacity();
            }
        }
        state.file_diffs.retain(|diff| diff.task_id() != id);
        state.time_entries.retain(|_, entry| entry.task_id() != id);
        state.tasks.remove(&id);
        apply_batch(&mut state, &remaining, at);
        Ok(holders.len())
    }

    async fn append_file_diff(&self, diff: &FileDiff) -> BoardRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(BoardRepositoryError::persistence)?;
        if !state.tasks.contains_key(&diff.task_id()) {
            return Err(BoardRepositoryError::NotFound(diff.task_id()));
        }
        state.file_diffs.push(diff.clone());
        Ok(())
    }

    async fn list_file_diffs(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<FileDiff>> {
        let state = self
            .read_state()
            .map_err(BoardRepositoryError::persistence)?;
        let mut diffs: Vec<FileDiff> = state
            .file_diffs
            .iter()
            .filter(|diff| diff.task_id() == task_id)
            .cloned()
            .collect();
        diffs.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(diffs)
    }
}
