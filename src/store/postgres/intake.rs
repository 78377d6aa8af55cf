//! Issue repository over `PostgreSQL`.

use super::{
    PostgresStore,
    board::{insert_task, is_constraint},
    models::IssueRow,
    schema::issues,
};
use crate::board::domain::{Task, TaskId};
use crate::intake::{
    domain::{Issue, IssueDetails, IssueId, IssueStatus, PersistedIssueData, Severity},
    ports::{IssueRepository, IssueRepositoryError, IssueRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const EXTERNAL_ID_CONSTRAINT: &str = "issues_external_id_unique";

#[async_trait]
impl IssueRepository for PostgresStore {
    async fn store_issue(&self, issue: &Issue) -> IssueRepositoryResult<()> {
        let issue_id = issue.id();
        let external_id = issue.external_id().to_owned();
        let row = to_issue_row(issue);

        self.run_blocking(move |connection| {
            if find_issue_row_by_external_id(connection, &external_id)?.is_some() {
                return Err(IssueRepositoryError::DuplicateExternalId(external_id));
            }

            diesel::insert_into(issues::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), EXTERNAL_ID_CONSTRAINT) =>
                    {
                        IssueRepositoryError::DuplicateExternalId(external_id.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        IssueRepositoryError::DuplicateIssue(issue_id)
                    }
                    _ => IssueRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_issue(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>> {
        self.run_blocking(move |connection| {
            let row = issues::table
                .filter(issues::id.eq(id.into_inner()))
                .select(IssueRow::as_select())
                .first::<IssueRow>(connection)
                .optional()?;
            row.map(row_to_issue).transpose()
        })
        .await
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> IssueRepositoryResult<Option<Issue>> {
        let lookup = external_id.to_owned();
        self.run_blocking(move |connection| {
            find_issue_row_by_external_id(connection, &lookup)?
                .map(row_to_issue)
                .transpose()
        })
        .await
    }

    async fn list_issues(&self) -> IssueRepositoryResult<Vec<Issue>> {
        let mut listed = self
            .run_blocking(|connection| {
                issues::table
                    .select(IssueRow::as_select())
                    .load::<IssueRow>(connection)?
                    .into_iter()
                    .map(row_to_issue)
                    .collect::<IssueRepositoryResult<Vec<_>>>()
            })
            .await?;
        listed.sort_by(|left, right| {
            right
                .effective_reported_date()
                .cmp(&left.effective_reported_date())
                .then_with(|| right.created_at().cmp(&left.created_at()))
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(listed)
    }

    async fn set_selection(
        &self,
        id: IssueId,
        selected: bool,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue> {
        self.run_blocking(move |connection| {
            let row = diesel::update(issues::table.filter(issues::id.eq(id.into_inner())))
                .set((
                    issues::selected_for_kanban.eq(selected),
                    issues::updated_at.eq(at),
                ))
                .returning(IssueRow::as_returning())
                .get_result::<IssueRow>(connection)
                .optional()?;
            row.map(row_to_issue)
                .transpose()?
                .ok_or(IssueRepositoryError::NotFound(id))
        })
        .await
    }

    async fn convert_issue(
        &self,
        id: IssueId,
        task: &Task,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue> {
        let created = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, IssueRepositoryError, _>(|tx| {
                let row = issues::table
                    .filter(issues::id.eq(id.into_inner()))
                    .select(IssueRow::as_select())
                    .for_update()
                    .first::<IssueRow>(tx)
                    .optional()?
                    .ok_or(IssueRepositoryError::NotFound(id))?;
                let mut issue = row_to_issue(row)?;
                if let Some(task_id) = issue.kanban_task_id() {
                    return Err(IssueRepositoryError::AlreadyConverted {
                        issue_id: id,
                        task_id,
                    });
                }

                insert_task(tx, &created)?;
                issue.link_task(created.id(), at);
                diesel::update(issues::table.filter(issues::id.eq(id.into_inner())))
                    .set((
                        issues::kanban_task_id.eq(issue.kanban_task_id().map(TaskId::into_inner)),
                        issues::status.eq(issue.status().as_str()),
                        issues::updated_at.eq(issue.updated_at()),
                    ))
                    .execute(tx)?;
                Ok(issue)
            })
        })
        .await
    }
}

fn find_issue_row_by_external_id(
    connection: &mut PgConnection,
    external_id: &str,
) -> IssueRepositoryResult<Option<IssueRow>> {
    Ok(issues::table
        .filter(issues::external_id.eq(external_id))
        .select(IssueRow::as_select())
        .first::<IssueRow>(connection)
        .optional()?)
}

fn to_issue_row(issue: &Issue) -> IssueRow {
    let details = issue.details().clone();
    IssueRow {
        id: issue.id().into_inner(),
        external_id: issue.external_id().to_owned(),
        title: issue.title().to_owned(),
        description: details.description,
        severity: issue.severity().as_str().to_owned(),
        category: details.category,
        reporter: details.reporter,
        reported_date: issue.reported_date(),
        affected_system: details.affected_system,
        reproduction_steps: details.reproduction_steps,
        expected_behavior: details.expected_behavior,
        actual_behavior: details.actual_behavior,
        status: issue.status().as_str().to_owned(),
        selected_for_kanban: issue.is_selected_for_kanban(),
        kanban_task_id: issue.kanban_task_id().map(TaskId::into_inner),
        created_at: issue.created_at(),
        updated_at: issue.updated_at(),
    }
}

fn row_to_issue(row: IssueRow) -> IssueRepositoryResult<Issue> {
    let severity =
        Severity::try_from(row.severity.as_str()).map_err(IssueRepositoryError::persistence)?;
    let status =
        IssueStatus::try_from(row.status.as_str()).map_err(IssueRepositoryError::persistence)?;
    Ok(Issue::from_persisted(PersistedIssueData {
        id: IssueId::from_uuid(row.id),
        external_id: row.external_id,
        title: row.title,
        severity,
        status,
        reported_date: row.reported_date,
        details: IssueDetails {
            description: row.description,
            category: row.category,
            reporter: row.reporter,
            affected_system: row.affected_system,
            reproduction_steps: row.reproduction_steps,
            expected_behavior: row.expected_behavior,
            actual_behavior: row.actual_behavior,
        },
        selected_for_kanban: row.selected_for_kanban,
        kanban_task_id: row.kanban_task_id.map(TaskId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
