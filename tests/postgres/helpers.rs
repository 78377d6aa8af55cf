//! Shared test helpers for `PostgreSQL` integration tests.

use std::future::Future;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use treasury_board::{
    agent::domain::{AgentId, AgentProfile},
    board::domain::Column,
    config::BoardConfig,
    store::{PostgresStore, postgres::BOARD_SCHEMA_SQL},
    workflow::KanbanWorkflow,
};
use uuid::Uuid;

/// Template database name for the pre-migrated board schema.
pub const TEMPLATE_DB: &str = "treasury_board_test_template";

/// Workflow type used by the `PostgreSQL` tests.
pub type PgWorkflow = KanbanWorkflow<PostgresStore, DefaultClock>;

/// A workflow over a freshly created database cloned from the template.
///
/// Fields drop in declaration order, so every pooled connection is closed
/// before the database itself is dropped.
pub struct PgBoard {
    pub workflow: PgWorkflow,
    pub store: Arc<PostgresStore>,
    runtime: Runtime,
    _cleanup: CleanupGuard,
}

/// Ensures the template database exists with the board schema applied.
///
/// # Errors
///
/// Returns an error if the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), eyre::Report> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut connection =
                PgConnection::establish(&url).map_err(|err| eyre::eyre!("{err}"))?;
            connection
                .batch_execute(BOARD_SCHEMA_SQL)
                .map_err(|err| eyre::eyre!("schema error: {err}"))?;
            Ok(())
        })
        .map_err(|err| eyre::eyre!("template setup failed: {err}"))
}

impl PgBoard {
    /// Clones the template into a private database and wires a workflow
    /// over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or reached.
    pub fn isolated(cluster: &'static TestCluster) -> Result<Self, eyre::Report> {
        ensure_template(cluster)?;
        let db_name = format!("board_test_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
            .map_err(|err| eyre::eyre!("database creation failed: {err}"))?;
        let cleanup = CleanupGuard {
            cluster,
            db_name: db_name.clone(),
        };

        let url = cluster.connection().database_url(&db_name);
        let pool = Pool::builder()
            .max_size(4)
            .build(ConnectionManager::<PgConnection>::new(url))?;
        let store = Arc::new(PostgresStore::new(pool));
        let workflow = KanbanWorkflow::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            Arc::new(BoardConfig::default()),
        );
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            workflow,
            store,
            runtime,
            _cleanup: cleanup,
        })
    }

    /// Drives `future` to completion on the board's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Creates the named columns in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any column cannot be created.
    pub async fn columns(&self, titles: &[&str]) -> Result<Vec<Column>, eyre::Report> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            created.push(self.workflow.board().create_column(*title, "").await?);
        }
        Ok(created)
    }

    /// Registers an available agent with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn agent(&self, name: &str, max_workload: u32) -> Result<AgentId, eyre::Report> {
        let profile = AgentProfile::new(name, format!("{name}@example.com"), "developer")?
            .with_max_workload(max_workload)
            .with_skills(vec!["sql".to_owned()]);
        Ok(self.workflow.assignments().register_agent(profile).await?.id())
    }

    /// Returns the stored workload of an agent.
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

/// Drops the per-test database even when the test fails.
struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    #[expect(
        clippy::print_stderr,
        reason = "cleanup failures are informational in tests"
    )]
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {err}", self.db_name);
        }
    }
}

/// Returns the single column at `index`.
///
/// # Errors
///
/// Returns an error if fewer columns exist.
pub fn column_at(columns: &[Column], index: usize) -> Result<&Column, eyre::Report> {
    columns
        .get(index)
        .ok_or_else(|| eyre::eyre!("missing column {index}"))
}
