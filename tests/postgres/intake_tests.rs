//! `PostgreSQL` integration tests for issue intake.

use super::helpers::{PgBoard, column_at};
use chrono::NaiveDate;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use treasury_board::{
    board::domain::Priority,
    intake::{
        domain::{Issue, IssueDetails, IssueReport, IssueStatus, Severity},
        ports::{IssueRepository, IssueRepositoryError},
        services::IntakeServiceError,
    },
};

fn report(external_id: &str, day: u32) -> Result<IssueReport, eyre::Report> {
    let reported = NaiveDate::from_ymd_opt(2026, 2, day)
        .ok_or_else(|| eyre::eyre!("invalid day {day}"))?;
    Ok(IssueReport::new(external_id, format!("Issue {external_id}"))?
        .with_severity(Severity::High)
        .with_reported_date(reported)
        .with_details(IssueDetails {
            description: Some("Totals disagree".to_owned()),
            affected_system: Some("ledger".to_owned()),
            ..IssueDetails::default()
        }))
}

#[rstest]
fn conversion_links_issue_and_task_once(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let columns = board.columns(&["Backlog", "Done"]).await?;
        let intake = board.workflow.intake();
        let issue = intake.ingest(report("INC-7", 3)?).await?;

        let first = board.workflow.convert_issues(&[issue.id()]).await?;
        let second = board.workflow.convert_issues(&[issue.id()]).await?;

        let converted = first
            .converted
            .first()
            .ok_or_else(|| eyre::eyre!("issue not converted"))?;
        eyre::ensure!(
            converted.task.column_id() == column_at(&columns, 0)?.id(),
            "task not in the backlog"
        );
        eyre::ensure!(converted.task.priority() == Priority::High, "priority not mapped");
        eyre::ensure!(
            converted
                .task
                .description()
                .is_some_and(|text| text.contains("ledger")),
            "description not rendered"
        );
        eyre::ensure!(second.skipped == [issue.id()], "second conversion not skipped");
        let stored = intake
            .list_issues()
            .await?
            .into_iter()
            .find(|candidate| candidate.id() == issue.id())
            .ok_or_else(|| eyre::eyre!("issue missing"))?;
        eyre::ensure!(
            stored.kanban_task_id() == Some(converted.task.id()),
            "link not persisted"
        );
        eyre::ensure!(stored.status() == IssueStatus::InProgress, "status not advanced");
        eyre::ensure!(board.workflow.board().list_tasks().await?.len() == 1, "extra tasks");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn duplicate_external_ids_are_rejected(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let intake = board.workflow.intake();
        let original = intake.ingest(report("INC-9", 1)?).await?;

        let result = intake.ingest(report("INC-9", 2)?).await;
        eyre::ensure!(
            matches!(
                result,
                Err(IntakeServiceError::AlreadyIngested { issue_id, .. }) if issue_id == original.id()
            ),
            "duplicate accepted: {result:?}"
        );

        let racer = Issue::new(report("INC-9", 3)?, &DefaultClock);
        let stored = board.store.store_issue(&racer).await;
        eyre::ensure!(
            matches!(stored, Err(IssueRepositoryError::DuplicateExternalId(_))),
            "unique constraint missing: {stored:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn issues_list_newest_report_first_and_keep_selection(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let board = PgBoard::isolated(shared_test_cluster)?;
    board.block_on(async {
        let intake = board.workflow.intake();
        let older = intake.ingest(report("INC-1", 1)?).await?;
        let newer = intake.ingest(report("INC-2", 20)?).await?;
        intake.set_selection(older.id(), true).await?;

        let listed = intake.list_issues().await?;

        let order: Vec<_> = listed.iter().map(|issue| issue.id()).collect();
        eyre::ensure!(order == [newer.id(), older.id()], "unexpected order");
        eyre::ensure!(
            listed
                .iter()
                .any(|issue| issue.id() == older.id() && issue.is_selected_for_kanban()),
            "selection not persisted"
        );
        Ok::<_, eyre::Report>(())
    })
}
