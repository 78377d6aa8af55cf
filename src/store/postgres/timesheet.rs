//! Time entry repository over `PostgreSQL`.

use super::{
    PostgresStore,
    models::TimeEntryRow,
    schema::{agents, tasks, time_entries},
};
use crate::agent::domain::AgentId;
use crate::board::domain::TaskId;
use crate::timesheet::{
    domain::{PersistedTimeEntryData, TimeEntry, TimeEntryId},
    ports::{TimeEntryRepository, TimeEntryRepositoryError, TimeEntryRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[async_trait]
impl TimeEntryRepository for PostgresStore {
    async fn store_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()> {
        let entry_id = entry.id();
        let task_id = entry.task_id();
        let agent_id = entry.agent_id();
        let row = to_entry_row(entry)?;

        self.run_blocking(move |connection| {
            let task = tasks::table
                .filter(tasks::id.eq(task_id.into_inner()))
                .select(tasks::id)
                .first::<uuid::Uuid>(connection)
                .optional()?;
            if task.is_none() {
                return Err(TimeEntryRepositoryError::TaskNotFound(task_id));
            }
            let agent = agents::table
                .filter(agents::id.eq(agent_id.into_inner()))
                .select(agents::id)
                .first::<uuid::Uuid>(connection)
                .optional()?;
            if agent.is_none() {
                return Err(TimeEntryRepositoryError::AgentNotFound(agent_id));
            }

            diesel::insert_into(time_entries::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TimeEntryRepositoryError::DuplicateEntry(entry_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TimeEntryRepositoryError::TaskNotFound(task_id)
                    }
                    _ => TimeEntryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_entry(&self, entry: &TimeEntry) -> TimeEntryRepositoryResult<()> {
        let entry_id = entry.id();
        let row = to_entry_row(entry)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                time_entries::table.filter(time_entries::id.eq(entry_id.into_inner())),
            )
            .set((
                time_entries::ended_at.eq(row.ended_at),
                time_entries::duration_minutes.eq(row.duration_minutes),
                time_entries::description.eq(row.description),
            ))
            .execute(connection)?;
            if affected == 0 {
                return Err(TimeEntryRepositoryError::NotFound(entry_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_entry(&self, id: TimeEntryId) -> TimeEntryRepositoryResult<Option<TimeEntry>> {
        self.run_blocking(move |connection| {
            let row = time_entries::table
                .filter(time_entries::id.eq(id.into_inner()))
                .select(TimeEntryRow::as_select())
                .first::<TimeEntryRow>(connection)
                .optional()?;
            row.map(row_to_entry).transpose()
        })
        .await
    }

    async fn list_task_entries(
        &self,
        task_id: TaskId,
    ) -> TimeEntryRepositoryResult<Vec<TimeEntry>> {
        self.run_blocking(move |connection| {
            time_entries::table
                .filter(time_entries::task_id.eq(task_id.into_inner()))
                .order((time_entries::started_at.desc(), time_entries::id.asc()))
                .select(TimeEntryRow::as_select())
                .load::<TimeEntryRow>(connection)?
                .into_iter()
                .map(row_to_entry)
                .collect()
        })
        .await
    }

    async fn list_agent_entries(
        &self,
        agent_id: AgentId,
    ) -> TimeEntryRepositoryResult<Vec<TimeEntry>> {
        self.run_blocking(move |connection| {
            time_entries::table
                .filter(time_entries::agent_id.eq(agent_id.into_inner()))
                .order((time_entries::started_at.desc(), time_entries::id.asc()))
                .select(TimeEntryRow::as_select())
                .load::<TimeEntryRow>(connection)?
                .into_iter()
                .map(row_to_entry)
                .collect()
        })
        .await
    }
}

fn to_entry_row(entry: &TimeEntry) -> TimeEntryRepositoryResult<TimeEntryRow> {
    Ok(TimeEntryRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        agent_id: entry.agent_id().into_inner(),
        started_at: entry.started_at(),
        ended_at: entry.ended_at(),
        duration_minutes: entry
            .duration_minutes()
            .map(i32::try_from)
            .transpose()
            .map_err(TimeEntryRepositoryError::persistence)?,
        description: entry.description().map(str::to_owned),
        created_at: entry.created_at(),
    })
}

fn row_to_entry(row: TimeEntryRow) -> TimeEntryRepositoryResult<TimeEntry> {
    Ok(TimeEntry::from_persisted(PersistedTimeEntryData {
        id: TimeEntryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        agent_id: AgentId::from_uuid(row.agent_id),
        started_at: row.started_at,
        ended_at: row.ended_at,
        duration_minutes: row
            .duration_minutes
            .map(u32::try_from)
            .transpose()
            .map_err(TimeEntryRepositoryError::persistence)?,
        description: row.description,
        created_at: row.created_at,
    }))
}
