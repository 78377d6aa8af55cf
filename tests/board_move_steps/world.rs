//! Shared world state for board ordering BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use treasury_board::{
    board::domain::{ColumnId, Task, TaskId},
    config::BoardConfig,
    store::InMemoryStore,
    workflow::KanbanWorkflow,
};

/// Workflow type used by the BDD world.
pub type TestWorkflow = KanbanWorkflow<InMemoryStore, DefaultClock>;

/// Scenario world for board ordering behaviour tests.
pub struct BoardWorld {
    pub workflow: TestWorkflow,
}

impl BoardWorld {
    /// Creates a world over an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workflow: KanbanWorkflow::new(
                Arc::new(InMemoryStore::new()),
                Arc::new(DefaultClock),
                Arc::new(BoardConfig::default()),
            ),
        }
    }

    /// Resolves a column by title.
    pub fn column_id(&self, title: &str) -> Result<ColumnId, eyre::Report> {
        let columns = run_async(self.workflow.board().list_columns())?;
        columns
            .iter()
            .find(|column| column.title() == title)
            .map(|column| column.id())
            .ok_or_else(|| eyre::eyre!("no column titled '{title}'"))
    }

    /// Resolves a task by title.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks()?
            .iter()
            .find(|task| task.title() == title)
            .map(Task::id)
            .ok_or_else(|| eyre::eyre!("no task titled '{title}'"))
    }

    /// Returns every task in board order.
    pub fn tasks(&self) -> Result<Vec<Task>, eyre::Report> {
        Ok(run_async(self.workflow.board().list_tasks())?)
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Splits a comma-separated list of titles.
pub fn titles(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
