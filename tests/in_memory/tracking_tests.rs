//! In-memory integration tests for time tracking and the read side.

use std::sync::Arc;

use super::helpers::{Board, board};
use mockable::DefaultClock;
use rstest::rstest;
use treasury_board::{
    board::{domain::{Position, TaskDraft}, services::MoveTaskRequest},
    config::BoardConfig,
    insights::InsightsService,
    timesheet::services::TimeTrackingService,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tracked_and_completed_work_shows_up_in_analytics(
    board: Board,
) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let agent_id = board.agent("Ada", 4).await?;
    let tracking = TimeTrackingService::new(Arc::clone(&board.store), Arc::new(DefaultClock));
    let insights = InsightsService::new(
        Arc::clone(&board.store),
        Arc::new(DefaultClock),
        Arc::new(BoardConfig::default()),
    );
    let created = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Reconcile")?, true)
        .await?;
    let entry = tracking.start(created.task.id(), agent_id, None).await?;
    tracking.stop(entry.id(), Some("done".to_owned())).await?;
    board
        .workflow
        .move_task(MoveTaskRequest::new(
            created.task.id(),
            columns.done.id(),
            Position::FIRST,
        ))
        .await?;

    let report = insights.analytics().await?;
    let progress = insights.agent_progress(agent_id).await?;
    let view = insights.board_view().await?;

    eyre::ensure!(report.statistics.total_tasks == 1, "wrong task total");
    eyre::ensure!(report.statistics.completed_tasks == 1, "task not done");
    eyre::ensure!(report.team_velocity == 1, "velocity missed the completion");
    let row = report
        .agent_performance
        .first()
        .ok_or_else(|| eyre::eyre!("missing agent row"))?;
    eyre::ensure!(row.completed_assignments == 1, "completion not credited");
    eyre::ensure!(row.efficiency_percent == 25, "unexpected efficiency");
    eyre::ensure!(progress.completed_tasks == 1, "progress missed completion");
    eyre::ensure!(progress.workload_percent == 0, "capacity not freed");
    let done_lane = view
        .columns
        .last()
        .ok_or_else(|| eyre::eyre!("missing done lane"))?;
    eyre::ensure!(done_lane.tasks.len() == 1, "task not shown in done");
    let stats = tracking.agent_stats(agent_id).await?;
    eyre::ensure!(stats.total_entries == 1, "entry not counted");
    Ok(())
}
