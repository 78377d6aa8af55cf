//! `PostgreSQL` integration tests for time entries.

use std::sync::Arc;

use super::helpers::{PgBoard, column_at};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use treasury_board::{
    agent::domain::AgentId,
    board::domain::TaskDraft,
    timesheet::{
        ports::TimeEntryRepositoryError,
        services::{TimeTrackingError, TimeTrackingService},
    },
};

#[rstest]
fn entries_round_trip_through_start_and_stop(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let agent_id = board.agent("Ada", 2).await?;
        let created = board
            .workflow
            .create_task(column_at(&columns, 0)?.id(), TaskDraft::new("Audit")?, false)
            .await?;
        let tracking = TimeTrackingService::new(Arc::clone(&board.store), Arc::new(DefaultClock));

        let entry = tracking
            .start(created.task.id(), agent_id, Some("sampling".to_owned()))
            .await?;
        let stopped = tracking.stop(entry.id(), None).await?;

        let listed = tracking.task_entries(created.task.id()).await?;
        let stored = listed
            .first()
            .ok_or_else(|| eyre::eyre!("entry not stored"))?;
        eyre::ensure!(stored.id() == entry.id(), "wrong entry");
        eyre::ensure!(stored.duration_minutes() == stopped.duration_minutes(), "duration lost");
        eyre::ensure!(stored.description() == Some("sampling"), "note lost");
        eyre::ensure!(!stored.is_running(), "stop not persisted");
        let stats = tracking.agent_stats(agent_id).await?;
        eyre::ensure!(stats.total_entries == 1, "stats missed the entry");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn entries_require_an_existing_agent(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let created = board
            .workflow
            .create_task(column_at(&columns, 0)?.id(), TaskDraft::new("Audit")?, false)
            .await?;
        let tracking = TimeTrackingService::new(Arc::clone(&board.store), Arc::new(DefaultClock));
        let missing = AgentId::new();

        let result = tracking.start(created.task.id(), missing, None).await;

        eyre::ensure!(
            matches!(
                result,
                Err(TimeTrackingError::Repository(TimeEntryRepositoryError::AgentNotFound(id)))
                    if id == missing
            ),
            "entry accepted for an unknown agent: {result:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}
