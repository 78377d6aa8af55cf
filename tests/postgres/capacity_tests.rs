//! `PostgreSQL` integration tests for workload accounting.

use super::helpers::{PgBoard, column_at};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use treasury_board::{
    agent::{
        domain::{AssignmentResolution, AssignmentStatus},
        ports::{AgentRepositoryError, AssignmentFilter},
        services::{AssignmentError, AssignmentOutcome, ManualAssignRequest},
    },
    board::domain::TaskDraft,
};

#[rstest]
fn concurrent_auto_assignment_never_exceeds_capacity(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let backlog = column_at(&columns, 0)?.id();
        let agent_id = board.agent("Ada", 1).await?;
        let first = board
            .workflow
            .create_task(backlog, TaskDraft::new("First")?, false)
            .await?;
        let second = board
            .workflow
            .create_task(backlog, TaskDraft::new("Second")?, false)
            .await?;

        let assignments = board.workflow.assignments();
        let (left, right) = tokio::join!(
            assignments.auto_assign(first.task.id()),
            assignments.auto_assign(second.task.id()),
        );

        let assigned = [left?, right?]
            .iter()
            .filter(|outcome| matches!(outcome, AssignmentOutcome::Assigned { .. }))
            .count();
        eyre::ensure!(assigned == 1, "expected exactly one assignment, got {assigned}");
        eyre::ensure!(board.workload(agent_id).await? == 1, "workload drifted");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn manual_assignment_respects_capacity_and_duplicates(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let backlog = column_at(&columns, 0)?.id();
        let agent_id = board.agent("Ada", 1).await?;
        let first = board
            .workflow
            .create_task(backlog, TaskDraft::new("First")?, false)
            .await?;
        let second = board
            .workflow
            .create_task(backlog, TaskDraft::new("Second")?, false)
            .await?;
        let assignments = board.workflow.assignments();

        assignments
            .assign(ManualAssignRequest::new(agent_id, first.task.id()).assigned_by("lead"))
            .await?;
        let duplicate = assignments
            .assign(ManualAssignRequest::new(agent_id, first.task.id()))
            .await;
        let full = assignments
            .assign(ManualAssignRequest::new(agent_id, second.task.id()))
            .await;

        eyre::ensure!(
            matches!(
                duplicate,
                Err(AssignmentError::Repository(
                    AgentRepositoryError::AlreadyAssigned { .. }
                ))
            ),
            "duplicate pair accepted: {duplicate:?}"
        );
        eyre::ensure!(
            matches!(full, Err(AssignmentError::CapacityExhausted(id)) if id == agent_id),
            "over-capacity assignment accepted: {full:?}"
        );
        eyre::ensure!(board.workload(agent_id).await? == 1, "workload drifted");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn release_frees_capacity_once(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let agent_id = board.agent("Ada", 2).await?;
        let created = board
            .workflow
            .create_task(column_at(&columns, 0)?.id(), TaskDraft::new("Close")?, true)
            .await?;
        let assignments = board.workflow.assignments();

        let released = assignments
            .release_task(created.task.id(), AssignmentResolution::Completed)
            .await?;
        let again = assignments
            .release_task(created.task.id(), AssignmentResolution::Completed)
            .await?;

        eyre::ensure!(released.len() == 1, "expected one release");
        eyre::ensure!(again.is_empty(), "released twice");
        eyre::ensure!(board.workload(agent_id).await? == 0, "capacity not freed");
        let history = assignments
            .assignments(AssignmentFilter::all().for_agent(agent_id))
            .await?;
        eyre::ensure!(
            history.iter().all(|row| row.completed_at().is_some()),
            "completion time missing"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn deleting_a_task_cancels_its_assignment(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog"]).await?;
        let agent_id = board.agent("Ada", 2).await?;
        let created = board
            .workflow
            .create_task(column_at(&columns, 0)?.id(), TaskDraft::new("Drop")?, true)
            .await?;

        let cancelled = board.workflow.delete_task(created.task.id()).await?;

        eyre::ensure!(cancelled == 1, "expected one cancelled assignment");
        eyre::ensure!(board.workload(agent_id).await? == 0, "capacity not returned");
        let history = board
            .workflow
            .assignments()
            .assignments(AssignmentFilter::all().for_agent(agent_id))
            .await?;
        let row = history
            .first()
            .ok_or_else(|| eyre::eyre!("assignment history dropped"))?;
        eyre::ensure!(history.len() == 1, "unexpected history {history:?}");
        eyre::ensure!(
            row.status() == AssignmentStatus::Cancelled && row.completed_at().is_some(),
            "assignment not cancelled: {row:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}
