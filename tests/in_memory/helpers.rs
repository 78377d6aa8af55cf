//! Shared test helpers for in-memory store integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use treasury_board::{
    agent::domain::{AgentId, AgentProfile},
    board::domain::Column,
    config::BoardConfig,
    store::InMemoryStore,
    workflow::KanbanWorkflow,
};

/// Workflow type used by the in-memory tests.
pub type TestWorkflow = KanbanWorkflow<InMemoryStore, DefaultClock>;

/// A workflow over a fresh store plus a handle on that store.
pub struct Board {
    pub store: Arc<InMemoryStore>,
    pub workflow: TestWorkflow,
}

/// The three conventional columns, in board order.
pub struct StandardColumns {
    pub backlog: Column,
    pub in_progress: Column,
    pub done: Column,
}

/// Provides a workflow with the default configuration.
#[fixture]
pub fn board() -> Board {
    let store = Arc::new(InMemoryStore::new());
    let workflow = KanbanWorkflow::new(
        Arc::clone(&store),
        Arc::new(DefaultClock),
        Arc::new(BoardConfig::default()),
    );
    Board { store, workflow }
}

impl Board {
    /// Creates `Backlog`, `In Progress` and `Done`.
    ///
    /// # Errors
    ///
    /// Returns an error if any column cannot be created.
    pub async fn standard_columns(&self) -> Result<StandardColumns, eyre::Report> {
        let board = self.workflow.board();
        Ok(StandardColumns {
            backlog: board.create_column("Backlog", "#94a3b8").await?,
            in_progress: board.create_column("In Progress", "#3b82f6").await?,
            done: board.create_column("Done", "#22c55e").await?,
        })
    }

    /// Registers an available agent with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn agent(&self, name: &str, max_workload: u32) -> Result<AgentId, eyre::Report> {
        let profile = AgentProfile::new(name, format!("{name}@example.com"), "developer")?
            .with_max_workload(max_workload);
        Ok(self.workflow.assignments().register_agent(profile).await?.id())
    }

    /// Returns the current workload of an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent is unknown.
    pub async fn workload(&self, agent_id: AgentId) -> Result<u32, eyre::Report> {
        let agent = self
            .workflow
            .assignments()
            .find_agent(agent_id)
            .await?
            .ok_or_else(|| eyre::eyre!("agent {agent_id} not found"))?;
        Ok(agent.current_workload())
    }
}
