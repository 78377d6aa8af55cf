//! Board repository over `PostgreSQL`.

use super::{
    PostgresStore,
    models::{ColumnRow, FileDiffRow, NewColumnRow, NewTaskRow, TaskFieldsChangeset, TaskRow},
    schema::{agent_assignments, agents, file_diffs, kanban_columns, tasks, time_entries},
};
use crate::agent::domain::AssignmentStatus;
use crate::board::{
    domain::{
        Column, ColumnId, FileDiff, FileDiffId, PersistedColumnData, PersistedFileDiffData,
        PersistedTaskData, Position, PositionUpdate, Priority, Task, TaskId,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::collections::BTreeSet;
use tracing::debug;

const COLUMN_POSITION_CONSTRAINT: &str = "kanban_columns_position_unique";

/// Inserts a task at the tail of its column, shared with issue conversion.
///
/// Must run inside a transaction: the owning column row stays locked until
/// commit so concurrent appends serialize on it.
pub(super) fn insert_task(connection: &mut PgConnection, task: &Task) -> BoardRepositoryResult<()> {
    let column_id = task.column_id();
    lock_columns(connection, &BTreeSet::from([column_id]))?;

    let column_len = tasks::table
        .filter(tasks::column_id.eq(column_id.into_inner()))
        .count()
        .get_result::<i64>(connection)?;
    let tail = usize::try_from(column_len)
        .map_err(BoardRepositoryError::persistence)
        .and_then(|len| Position::from_index(len).map_err(BoardRepositoryError::persistence))?;
    if task.position() != tail {
        return Err(BoardRepositoryError::PositionConflict {
            column_id,
            requested: task.position(),
            expected: tail,
        });
    }

    let task_id = task.id();
    diesel::insert_into(tasks::table)
        .values(&to_new_task_row(task)?)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                BoardRepositoryError::DuplicateTask(task_id)
            }
            _ => BoardRepositoryError::persistence(err),
        })?;
    Ok(())
}

/// Locks the rows of `column_ids` in identifier order, failing on the first
/// missing column.
fn lock_columns(
    connection: &mut PgConnection,
    column_ids: &BTreeSet<ColumnId>,
) -> BoardRepositoryResult<()> {
    let raw_ids: Vec<uuid::Uuid> = column_ids.iter().map(|id| id.into_inner()).collect();
    let locked: BTreeSet<uuid::Uuid> = kanban_columns::table
        .filter(kanban_columns::id.eq_any(raw_ids))
        .order(kanban_columns::id.asc())
        .select(kanban_columns::id)
        .for_update()
        .load::<uuid::Uuid>(connection)?
        .into_iter()
        .collect();
    match column_ids
        .iter()
        .find(|id| !locked.contains(&id.into_inner()))
    {
        Some(missing) => Err(BoardRepositoryError::ColumnNotFound(*missing)),
        None => Ok(()),
    }
}

fn apply_batch(
    connection: &mut PgConnection,
    updates: &[PositionUpdate],
    at: DateTime<Utc>,
) -> BoardRepositoryResult<()> {
    let touched: BTreeSet<ColumnId> = updates.iter().map(|update| update.column_id).collect();
    lock_columns(connection, &touched)?;

    for update in updates {
        let affected = diesel::update(tasks::table.filter(tasks::id.eq(update.task_id.into_inner())))
            .set((
                tasks::column_id.eq(update.column_id.into_inner()),
                tasks::position.eq(position_to_sql(update.position)?),
                tasks::updated_at.eq(at),
            ))
            .execute(connection)?;
        if affected == 0 {
            return Err(BoardRepositoryError::NotFound(update.task_id));
        }
    }
    Ok(())
}

#[async_trait]
impl BoardRepository for PostgresStore {
    async fn store_column(&self, column: &Column) -> BoardRepositoryResult<()> {
        let column_id = column.id();
        let requested = column.position();
        let new_row = NewColumnRow {
            id: column_id.into_inner(),
            title: column.title().to_owned(),
            position: position_to_sql(requested)?,
            color: column.color().to_owned(),
            created_at: column.created_at(),
        };

        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|tx| {
                let board_len = kanban_columns::table.count().get_result::<i64>(tx)?;
                let expected = usize::try_from(board_len)
                    .map_err(BoardRepositoryError::persistence)
                    .and_then(|len| {
                        Position::from_index(len).map_err(BoardRepositoryError::persistence)
                    })?;
                if requested != expected {
                    return Err(BoardRepositoryError::ColumnPositionConflict {
                        requested,
                        expected,
                    });
                }

                diesel::insert_into(kanban_columns::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if is_constraint(info.as_ref(), COLUMN_POSITION_CONSTRAINT) =>
                        {
                            BoardRepositoryError::ColumnPositionConflict {
                                requested,
                                expected,
                            }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            BoardRepositoryError::DuplicateColumn(column_id)
                        }
                        _ => BoardRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn find_column(&self, id: ColumnId) -> BoardRepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = kanban_columns::table
                .filter(kanban_columns::id.eq(id.into_inner()))
                .select(ColumnRow::as_select())
                .first::<ColumnRow>(connection)
                .optional()?;
            row.map(row_to_column).transpose()
        })
        .await
    }

    async fn list_columns(&self) -> BoardRepositoryResult<Vec<Column>> {
        self.run_blocking(|connection| {
            kanban_columns::table
                .order(kanban_columns::position.asc())
                .select(ColumnRow::as_select())
                .load::<ColumnRow>(connection)?
                .into_iter()
                .map(row_to_column)
                .collect()
        })
        .await
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let stored = task.clone();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, BoardRepositoryError, _>(|tx| insert_task(tx, &stored))
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let changes = TaskFieldsChangeset {
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority().as_str().to_owned(),
            assignee: task.assignee().map(str::to_owned),
            due_date: task.due_date(),
            updated_at: task.updated_at(),
        };

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&changes)
                .execute(connection)?;
            if affected == 0 {
                return Err(BoardRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_tasks(&self) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(|connection| {
            tasks::table
                .inner_join(kanban_columns::table)
                .order((
                    kanban_columns::position.asc(),
                    tasks::position.asc(),
                    tasks::created_at.asc(),
                    tasks::id.asc(),
                ))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn list_column_tasks(&self, column_id: ColumnId) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::column_id.eq(column_id.into_inner()))
                .order((
                    tasks::position.asc(),
                    tasks::created_at.asc(),
                    tasks::id.asc(),
                ))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn apply_positions(
        &self,
        updates: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<()> {
        let batch = updates.to_vec();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, BoardRepositoryError, _>(|tx| apply_batch(tx, &batch, at))
        })
        .await
    }

    async fn delete_task(
        &self,
        id: TaskId,
        compaction: &[PositionUpdate],
        at: DateTime<Utc>,
    ) -> BoardRepositoryResult<usize> {
        let remaining: Vec<PositionUpdate> = compaction
            .iter()
            .filter(|update| update.task_id != id)
            .copied()
            .collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|tx| {
                let task_key = id.into_inner();
                let found = tasks::table
                    .filter(tasks::id.eq(task_key))
                    .select(tasks::id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if found.is_none() {
                    return Err(BoardRepositoryError::NotFound(id));
                }

                let mut holders = diesel::update(
                    agent_assignments::table
                        .filter(agent_assignments::task_id.eq(task_key))
                        .filter(agent_assignments::status.eq(AssignmentStatus::Active.as_str())),
                )
                .set((
                    agent_assignments::status.eq(AssignmentStatus::Cancelled.as_str()),
                    agent_assignments::completed_at.eq(Some(at)),
                ))
                .returning(agent_assignments::agent_id)
                .get_results::<uuid::Uuid>(tx)?;
                holders.sort_unstable();
                for agent_key in &holders {
                    diesel::update(
                        agents::table
                            .filter(agents::id.eq(*agent_key))
                            .filter(agents::current_workload.gt(0)),
                    )
                    .set(agents::current_workload.eq(agents::current_workload - 1))
                    .execute(tx)?;
                }

                diesel::delete(file_diffs::table.filter(file_diffs::task_id.eq(task_key)))
                    .execute(tx)?;
                diesel::delete(time_entries::table.filter(time_entries::task_id.eq(task_key)))
                    .execute(tx)?;
                diesel::delete(tasks::table.filter(tasks::id.eq(task_key))).execute(tx)?;

                apply_batch(tx, &remaining, at)?;
                debug!(task_id = %id, released = holders.len(), "deleted task");
                Ok(holders.len())
            })
        })
        .await
    }

    async fn append_file_diff(&self, diff: &FileDiff) -> BoardRepositoryResult<()> {
        let task_id = diff.task_id();
        let row = FileDiffRow {
            id: diff.id().into_inner(),
            task_id: task_id.into_inner(),
            file_path: diff.file_path().to_owned(),
            old_content: diff.old_content().map(str::to_owned),
            new_content: diff.new_content().map(str::to_owned),
            diff_content: diff.diff_content().map(str::to_owned),
            created_at: diff.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(file_diffs::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        BoardRepositoryError::NotFound(task_id)
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_file_diffs(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<FileDiff>> {
        self.run_blocking(move |connection| {
            let rows = file_diffs::table
                .filter(file_diffs::task_id.eq(task_id.into_inner()))
                .order((file_diffs::created_at.desc(), file_diffs::id.asc()))
                .select(FileDiffRow::as_select())
                .load::<FileDiffRow>(connection)?;
            Ok(rows.into_iter().map(row_to_file_diff).collect())
        })
        .await
    }
}

fn to_new_task_row(task: &Task) -> BoardRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        column_id: task.column_id().into_inner(),
        position: position_to_sql(task.position())?,
        priority: task.priority().as_str().to_owned(),
        assignee: task.assignee().map(str::to_owned),
        due_date: task.due_date(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn position_to_sql(position: Position) -> BoardRepositoryResult<i32> {
    i32::try_from(position.value()).map_err(BoardRepositoryError::persistence)
}

fn position_from_sql(raw: i32) -> BoardRepositoryResult<Position> {
    u32::try_from(raw)
        .map(Position::new)
        .map_err(BoardRepositoryError::persistence)
}

fn row_to_column(row: ColumnRow) -> BoardRepositoryResult<Column> {
    Ok(Column::from_persisted(PersistedColumnData {
        id: ColumnId::from_uuid(row.id),
        title: row.title,
        position: position_from_sql(row.position)?,
        color: row.color,
        created_at: row.created_at,
    }))
}

fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(BoardRepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        column_id: ColumnId::from_uuid(row.column_id),
        position: position_from_sql(row.position)?,
        priority,
        assignee: row.assignee,
        due_date: row.due_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_file_diff(row: FileDiffRow) -> FileDiff {
    FileDiff::from_persisted(PersistedFileDiffData {
        id: FileDiffId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        file_path: row.file_path,
        old_content: row.old_content,
        new_content: row.new_content,
        diff_content: row.diff_content,
        created_at: row.created_at,
    })
}

pub(super) fn is_constraint(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}
