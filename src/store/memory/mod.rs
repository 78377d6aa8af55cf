//! In-memory entity store for tests and embedding.
//!
//! All repositories share one state behind a single [`RwLock`]. Each
//! mutating call validates everything it needs before touching the state,
//! so a rejected call changes nothing.

mod agent;
mod board;
mod intake;
mod timesheet;

use crate::agent::domain::{Agent, AgentAssignment, AgentId, AssignmentId};
use crate::board::domain::{Column, ColumnId, FileDiff, Task, TaskId};
use crate::intake::domain::{Issue, IssueId};
use crate::timesheet::domain::{TimeEntry, TimeEntryId};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory store implementing every repository port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
    file_diffs: Vec<FileDiff>,
    agents: HashMap<AgentId, Agent>,
    assignments: HashMap<AssignmentId, AgentAssignment>,
    issues: HashMap<IssueId, Issue>,
    time_entries: HashMap<TimeEntryId, TimeEntry>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, io::Error> {
        self.state
            .read()
            .map_err(|err| io::Error::other(err.to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, io::Error> {
        self.state
            .write()
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl StoreState {
    fn column_len(&self, column_id: ColumnId) -> usize {
        self.tasks
            .values()
            .filter(|task| task.column_id() == column_id)
            .count()
    }
}
