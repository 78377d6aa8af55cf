//! In-memory integration tests for the board workflow.

use super::helpers::{Board, board};
use rstest::rstest;
use treasury_board::{
    agent::{
        domain::{AgentStatus, AssignmentStatus},
        ports::AssignmentFilter,
        services::{AssignmentOutcome, ManualAssignRequest},
    },
    board::{
        domain::{Position, TaskDraft, position},
        services::{BoardServiceError, MoveTaskRequest},
    },
    intake::{
        domain::{IssueReport, Severity},
        services::AutoAssignment,
    },
    workflow::WorkflowError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_auto_assigned_to_the_least_loaded_agent(
    board: Board,
) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let busy = board.agent("Ada", 3).await?;
    let idle = board.agent("Grace", 3).await?;
    board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Warm-up")?, false)
        .await?;
    let warm_up = board.workflow.board().list_tasks().await?;
    let first = warm_up.first().ok_or_else(|| eyre::eyre!("task missing"))?;
    board
        .workflow
        .assignments()
        .assign(ManualAssignRequest::new(busy, first.id()))
        .await?;

    let created = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Audit")?, true)
        .await?;

    let Some(AssignmentOutcome::Assigned { agent, assignment }) = created.assignment else {
        eyre::bail!("expected an assignment, got {:?}", created.assignment);
    };
    eyre::ensure!(agent.id() == idle, "expected the idle agent to be chosen");
    eyre::ensure!(assignment.task_id() == created.task.id(), "wrong task");
    eyre::ensure!(board.workload(idle).await? == 1, "idle agent gained no load");
    eyre::ensure!(created.task.position() == Position::new(1), "task not appended");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn auto_assignment_without_candidates_leaves_the_task_unassigned(
    board: Board,
) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let agent_id = board.agent("Ada", 2).await?;
    board
        .workflow
        .assignments()
        .set_status(agent_id, AgentStatus::Offline)
        .await?;

    let created = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Orphan")?, true)
        .await?;

    eyre::ensure!(
        created.assignment == Some(AssignmentOutcome::NoAgentAvailable),
        "expected no agent, got {:?}",
        created.assignment
    );
    eyre::ensure!(board.workload(agent_id).await? == 0, "workload changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_into_done_completes_the_assignment(board: Board) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let agent_id = board.agent("Ada", 2).await?;
    let created = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Close books")?, true)
        .await?;
    let task_id = created.task.id();

    board
        .workflow
        .move_task(MoveTaskRequest::new(
            task_id,
            columns.in_progress.id(),
            Position::FIRST,
        ))
        .await?;
    eyre::ensure!(board.workload(agent_id).await? == 1, "load dropped early");

    let moved = board
        .workflow
        .move_task(MoveTaskRequest::new(task_id, columns.done.id(), Position::FIRST))
        .await?;

    eyre::ensure!(moved.released.len() == 1, "expected one release");
    eyre::ensure!(board.workload(agent_id).await? == 0, "capacity not freed");
    let history = board
        .workflow
        .assignments()
        .assignments(AssignmentFilter::all().for_task(task_id))
        .await?;
    let statuses: Vec<AssignmentStatus> = history.iter().map(|row| row.status()).collect();
    eyre::ensure!(
        statuses == [AssignmentStatus::Completed],
        "unexpected statuses {statuses:?}"
    );

    let again = board
        .workflow
        .move_task(MoveTaskRequest::new(task_id, columns.done.id(), Position::FIRST))
        .await?;
    eyre::ensure!(again.plan.is_noop(), "repeat move should change nothing");
    eyre::ensure!(again.released.is_empty(), "repeat move released again");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cancels_and_compacts(board: Board) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let agent_id = board.agent("Ada", 2).await?;
    let mut ids = Vec::new();
    for title in ["A", "B", "C"] {
        let created = board
            .workflow
            .create_task(columns.backlog.id(), TaskDraft::new(title)?, true)
            .await?;
        ids.push(created.task.id());
    }
    let middle = *ids.get(1).ok_or_else(|| eyre::eyre!("missing task"))?;

    let cancelled = board.workflow.delete_task(middle).await?;

    eyre::ensure!(cancelled == 1, "expected one cancelled assignment");
    eyre::ensure!(board.workload(agent_id).await? == 1, "capacity not returned");
    let tasks = board.workflow.board().list_tasks().await?;
    eyre::ensure!(tasks.len() == 2, "task not removed");
    eyre::ensure!(
        position::is_dense(&tasks, columns.backlog.id()),
        "backlog left with a gap"
    );
    let result = board.workflow.delete_task(middle).await;
    eyre::ensure!(
        matches!(result, Err(WorkflowError::Board(BoardServiceError::TaskNotFound(id))) if id == middle),
        "second delete should report a missing task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_keep_their_assignment_history(board: Board) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    let agent_id = board.agent("Ada", 2).await?;
    let finished = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Finished")?, true)
        .await?
        .task
        .id();
    let open = board
        .workflow
        .create_task(columns.backlog.id(), TaskDraft::new("Open")?, true)
        .await?
        .task
        .id();
    board
        .workflow
        .move_task(MoveTaskRequest::new(finished, columns.done.id(), Position::FIRST))
        .await?;

    board.workflow.delete_task(finished).await?;
    board.workflow.delete_task(open).await?;

    let history = board
        .workflow
        .assignments()
        .assignments(AssignmentFilter::all().for_agent(agent_id))
        .await?;
    eyre::ensure!(history.len() == 2, "assignment rows were dropped: {history:?}");
    let status_of = |task_id| {
        history
            .iter()
            .find(|row| row.task_id() == task_id)
            .map(|row| (row.status(), row.completed_at().is_some()))
    };
    eyre::ensure!(
        status_of(open) == Some((AssignmentStatus::Cancelled, true)),
        "open assignment not cancelled"
    );
    eyre::ensure!(
        status_of(finished) == Some((AssignmentStatus::Completed, true)),
        "completed assignment rewritten by delete"
    );
    eyre::ensure!(board.workload(agent_id).await? == 0, "capacity not returned");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn converted_issues_land_in_the_backlog(board: Board) -> Result<(), eyre::Report> {
    let columns = board.standard_columns().await?;
    board.agent("Ada", 5).await?;
    let critical = board
        .workflow
        .intake()
        .ingest(IssueReport::new("INC-1", "Ledger drift")?.with_severity(Severity::High))
        .await?;
    let minor = board
        .workflow
        .intake()
        .ingest(IssueReport::new("INC-2", "Typo in report")?.with_severity(Severity::Low))
        .await?;

    let report = board
        .workflow
        .convert_issues(&[critical.id(), minor.id(), critical.id()])
        .await?;
    let repeat = board.workflow.convert_issues(&[critical.id()]).await?;

    eyre::ensure!(report.converted.len() == 2, "expected two conversions");
    eyre::ensure!(report.skipped.is_empty(), "duplicate request ids not collapsed");
    eyre::ensure!(repeat.converted.is_empty(), "issue converted twice");
    eyre::ensure!(repeat.skipped == [critical.id()], "repeat not skipped");
    for converted in &report.converted {
        eyre::ensure!(
            converted.task.column_id() == columns.backlog.id(),
            "task not in backlog"
        );
        eyre::ensure!(
            matches!(
                converted.assignment,
                AutoAssignment::Ran(AssignmentOutcome::Assigned { .. })
            ),
            "converted task not assigned"
        );
        eyre::ensure!(
            converted.issue.kanban_task_id() == Some(converted.task.id()),
            "issue not linked"
        );
    }
    let tasks = board.workflow.board().list_tasks().await?;
    eyre::ensure!(tasks.len() == 2, "duplicate tasks created");
    Ok(())
}
