//! Shared world state for automatic assignment BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use treasury_board::{
    agent::{domain::AgentId, services::AssignmentOutcome},
    board::domain::{Column, Task},
    config::BoardConfig,
    store::InMemoryStore,
    workflow::KanbanWorkflow,
};

/// Workflow type used by the BDD world.
pub type TestWorkflow = KanbanWorkflow<InMemoryStore, DefaultClock>;

/// Scenario world for automatic assignment behaviour tests.
pub struct AssignmentWorld {
    pub workflow: TestWorkflow,
    pub columns: Vec<Column>,
    pub agents: HashMap<String, AgentId>,
    pub last_task: Option<Task>,
    pub last_outcome: Option<AssignmentOutcome>,
}

impl AssignmentWorld {
    /// Creates a world over an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workflow: KanbanWorkflow::new(
                Arc::new(InMemoryStore::new()),
                Arc::new(DefaultClock),
                Arc::new(BoardConfig::default()),
            ),
            columns: Vec::new(),
            agents: HashMap::new(),
            last_task: None,
            last_outcome: None,
        }
    }

    /// Creates the conventional columns on first use.
    pub fn ensure_columns(&mut self) -> Result<(), eyre::Report> {
        if !self.columns.is_empty() {
            return Ok(());
        }
        for title in ["Backlog", "In Progress", "Done"] {
            let column = run_async(self.workflow.board().create_column(title, ""))?;
            self.columns.push(column);
        }
        Ok(())
    }

    /// Resolves a column by title.
    pub fn column(&self, title: &str) -> Result<&Column, eyre::Report> {
        self.columns
            .iter()
            .find(|column| column.title() == title)
            .ok_or_else(|| eyre::eyre!("no column titled '{title}'"))
    }

    /// Resolves a registered agent by name.
    pub fn agent_id(&self, name: &str) -> Result<AgentId, eyre::Report> {
        self.agents
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no agent named '{name}'"))
    }

    /// Returns the task created by the scenario.
    pub fn last_task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }
}

impl Default for AssignmentWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AssignmentWorld {
    AssignmentWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
