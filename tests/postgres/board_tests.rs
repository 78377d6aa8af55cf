//! `PostgreSQL` integration tests for board ordering.

use super::helpers::{PgBoard, column_at};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use treasury_board::board::{
    domain::{FileDiff, Position, Priority, TaskDraft, TaskPatch, position},
    services::{MoveTaskRequest, RecordFileDiffRequest},
};

#[rstest]
fn cross_column_move_keeps_both_columns_dense(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog", "In Progress", "Done"]).await?;
        let backlog = column_at(&columns, 0)?.id();
        let doing = column_at(&columns, 1)?.id();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let created = board
                .workflow
                .create_task(backlog, TaskDraft::new(title)?, false)
                .await?;
            ids.push(created.task.id());
        }
        let first_doing = board
            .workflow
            .create_task(doing, TaskDraft::new("D")?, false)
            .await?;
        let moving = *ids.get(1).ok_or_else(|| eyre::eyre!("missing task"))?;

        let moved = board
            .workflow
            .move_task(MoveTaskRequest::new(moving, doing, Position::FIRST))
            .await?;

        eyre::ensure!(moved.plan.final_position() == Position::FIRST, "not at top");
        let tasks = board.workflow.board().list_tasks().await?;
        eyre::ensure!(position::is_dense(&tasks, backlog), "backlog has a gap");
        eyre::ensure!(position::is_dense(&tasks, doing), "in progress has a gap");
        let doing_order: Vec<_> = tasks
            .iter()
            .filter(|task| task.column_id() == doing)
            .map(|task| task.id())
            .collect();
        eyre::ensure!(
            doing_order == [moving, first_doing.task.id()],
            "unexpected order {doing_order:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn same_column_reorder_and_delete_compaction(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let backlog = column_at(&columns, 0)?.id();
        let mut ids = Vec::new();
        for title in ["A", "B", "C", "D"] {
            let created = board
                .workflow
                .create_task(backlog, TaskDraft::new(title)?, false)
                .await?;
            ids.push(created.task.id());
        }
        let first = *ids.first().ok_or_else(|| eyre::eyre!("missing task"))?;
        let last = *ids.last().ok_or_else(|| eyre::eyre!("missing task"))?;

        board
            .workflow
            .move_task(MoveTaskRequest::new(first, backlog, Position::new(99)))
            .await?;
        board.workflow.delete_task(last).await?;

        let titles: Vec<String> = board
            .workflow
            .board()
            .list_tasks()
            .await?
            .iter()
            .map(|task| task.title().to_owned())
            .collect();
        eyre::ensure!(titles == ["B", "C", "A"], "unexpected order {titles:?}");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn task_edits_and_file_diffs_persist(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let created = board
            .workflow
            .create_task(column_at(&columns, 0)?.id(), TaskDraft::new("Draft")?, false)
            .await?;
        let task_id = created.task.id();

        board
            .workflow
            .board()
            .update_task(
                task_id,
                TaskPatch::new()
                    .with_title("Final")
                    .with_priority(Priority::High)
                    .with_description(Some("Ready".to_owned())),
            )
            .await?;
        board
            .workflow
            .board()
            .record_file_diff(
                RecordFileDiffRequest::new(task_id, "src/ledger.rs").with_diff_content("+ total"),
            )
            .await?;

        let details = board.workflow.board().task_details(task_id).await?;
        eyre::ensure!(details.task.title() == "Final", "title not saved");
        eyre::ensure!(details.task.priority() == Priority::High, "priority not saved");
        eyre::ensure!(details.task.description() == Some("Ready"), "description lost");
        let paths: Vec<&str> = details.file_diffs.iter().map(FileDiff::file_path).collect();
        eyre::ensure!(paths == ["src/ledger.rs"], "unexpected diffs {paths:?}");
        Ok::<_, eyre::Report>(())
    })
}
