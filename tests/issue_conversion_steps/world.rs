//! Shared world state for issue conversion BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use treasury_board::{
    config::BoardConfig,
    intake::{domain::IssueId, services::ConversionReport},
    store::InMemoryStore,
    workflow::{KanbanWorkflow, WorkflowError},
};

/// Workflow type used by the BDD world.
pub type TestWorkflow = KanbanWorkflow<InMemoryStore, DefaultClock>;

/// Scenario world for issue conversion behaviour tests.
pub struct IntakeWorld {
    pub workflow: TestWorkflow,
    pub issues: HashMap<String, IssueId>,
    pub last_result: Option<Result<ConversionReport, WorkflowError>>,
}

impl IntakeWorld {
    /// Creates a world over an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workflow: KanbanWorkflow::new(
                Arc::new(InMemoryStore::new()),
                Arc::new(DefaultClock),
                Arc::new(BoardConfig::default()),
            ),
            issues: HashMap::new(),
            last_result: None,
        }
    }

    /// Resolves an ingested issue by external identifier.
    pub fn issue_id(&self, external_id: &str) -> Result<IssueId, eyre::Report> {
        self.issues
            .get(external_id)
            .copied()
            .ok_or_else(|| eyre::eyre!("no issue '{external_id}' was reported"))
    }

    /// Returns the report of the last successful conversion.
    pub fn last_report(&self) -> Result<&ConversionReport, eyre::Report> {
        match &self.last_result {
            Some(Ok(report)) => Ok(report),
            Some(Err(err)) => Err(eyre::eyre!("last conversion failed: {err}")),
            None => Err(eyre::eyre!("no conversion ran in this scenario")),
        }
    }
}

impl Default for IntakeWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> IntakeWorld {
    IntakeWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
