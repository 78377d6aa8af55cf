//! Agent repository over `PostgreSQL`.
//!
//! Workload changes are conditional `UPDATE`s evaluated by the database, so
//! two concurrent assignments can never push an agent past capacity.

use super::{
    PostgresStore,
    board::is_constraint,
    models::{AgentRow, AssignmentRow},
    schema::{agent_assignments, agents, tasks},
};
use crate::agent::{
    domain::{
        Agent, AgentAssignment, AgentId, AgentStatus, AssignmentId, AssignmentResolution,
        AssignmentStatus, PersistedAgentData, PersistedAssignmentData,
    },
    ports::{AgentRepository, AgentRepositoryError, AgentRepositoryResult, AssignmentFilter},
};
use crate::board::domain::TaskId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const EMAIL_CONSTRAINT: &str = "agents_email_unique";
const ACTIVE_ASSIGNMENT_INDEX: &str = "idx_agent_assignments_active_unique";

#[async_trait]
impl AgentRepository for PostgresStore {
    async fn store_agent(&self, agent: &Agent) -> AgentRepositoryResult<()> {
        let agent_id = agent.id();
        let email = agent.email().to_owned();
        let row = to_agent_row(agent)?;

        self.run_blocking(move |connection| {
            let taken = agents::table
                .filter(agents::email.eq(email.as_str()))
                .select(agents::id)
                .first::<uuid::Uuid>(connection)
                .optional()?;
            if taken.is_some() {
                return Err(AgentRepositoryError::DuplicateEmail(email));
            }

            diesel::insert_into(agents::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), EMAIL_CONSTRAINT) =>
                    {
                        AgentRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AgentRepositoryError::DuplicateAgent(agent_id)
                    }
                    _ => AgentRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn set_status(&self, id: AgentId, status: AgentStatus) -> AgentRepositoryResult<Agent> {
        self.run_blocking(move |connection| {
            let row = diesel::update(agents::table.filter(agents::id.eq(id.into_inner())))
                .set(agents::status.eq(status.as_str()))
                .returning(AgentRow::as_returning())
                .get_result::<AgentRow>(connection)
                .optional()?;
            row.map(row_to_agent)
                .transpose()?
                .ok_or(AgentRepositoryError::NotFound(id))
        })
        .await
    }

    async fn find_agent(&self, id: AgentId) -> AgentRepositoryResult<Option<Agent>> {
        self.run_blocking(move |connection| {
            let row = agents::table
                .filter(agents::id.eq(id.into_inner()))
                .select(AgentRow::as_select())
                .first::<AgentRow>(connection)
                .optional()?;
            row.map(row_to_agent).transpose()
        })
        .await
    }

    async fn list_agents(&self) -> AgentRepositoryResult<Vec<Agent>> {
        self.run_blocking(|connection| {
            agents::table
                .order((agents::name.asc(), agents::id.asc()))
                .select(AgentRow::as_select())
                .load::<AgentRow>(connection)?
                .into_iter()
                .map(row_to_agent)
                .collect()
        })
        .await
    }

    async fn list_available_agents(&self) -> AgentRepositoryResult<Vec<Agent>> {
        self.run_blocking(|connection| {
            agents::table
                .filter(agents::status.eq(AgentStatus::Available.as_str()))
                .filter(agents::current_workload.lt(agents::max_workload))
                .order((agents::current_workload.asc(), agents::id.asc()))
                .select(AgentRow::as_select())
                .load::<AgentRow>(connection)?
                .into_iter()
                .map(row_to_agent)
                .collect()
        })
        .await
    }

    async fn record_assignment(
        &self,
        assignment: &AgentAssignment,
    ) -> AgentRepositoryResult<Agent> {
        let assignment_id = assignment.id();
        let agent_id = assignment.agent_id();
        let task_id = assignment.task_id();
        let row = to_assignment_row(assignment);

        self.run_blocking(move |connection| {
            connection.transaction::<_, AgentRepositoryError, _>(|tx| {
                let duplicate = agent_assignments::table
                    .filter(agent_assignments::id.eq(assignment_id.into_inner()))
                    .select(agent_assignments::id)
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if duplicate.is_some() {
                    return Err(AgentRepositoryError::DuplicateAssignment(assignment_id));
                }
                let task = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .select(tasks::id)
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if task.is_none() {
                    return Err(AgentRepositoryError::TaskNotFound(task_id));
                }
                if holds_task(tx, agent_id, task_id)? {
                    return Err(AgentRepositoryError::AlreadyAssigned { agent_id, task_id });
                }

                let updated = diesel::update(
                    agents::table
                        .filter(agents::id.eq(agent_id.into_inner()))
                        .filter(agents::current_workload.lt(agents::max_workload)),
                )
                .set(agents::current_workload.eq(agents::current_workload + 1))
                .returning(AgentRow::as_returning())
                .get_result::<AgentRow>(tx)
                .optional()?;
                let Some(agent_row) = updated else {
                    let exists = agents::table
                        .filter(agents::id.eq(agent_id.into_inner()))
                        .select(agents::id)
                        .first::<uuid::Uuid>(tx)
                        .optional()?;
                    return Err(if exists.is_some() {
                        AgentRepositoryError::AtCapacity(agent_id)
                    } else {
                        AgentRepositoryError::NotFound(agent_id)
                    });
                };

                diesel::insert_into(agent_assignments::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if is_constraint(info.as_ref(), ACTIVE_ASSIGNMENT_INDEX) =>
                        {
                            AgentRepositoryError::AlreadyAssigned { agent_id, task_id }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            AgentRepositoryError::DuplicateAssignment(assignment_id)
                        }
                        _ => AgentRepositoryError::persistence(err),
                    })?;
                row_to_agent(agent_row)
            })
        })
        .await
    }

    async fn release_task(
        &self,
        task_id: TaskId,
        resolution: AssignmentResolution,
        at: DateTime<Utc>,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>> {
        let status: AssignmentStatus = resolution.into();
        self.run_blocking(move |connection| {
            connection.transaction::<_, AgentRepositoryError, _>(|tx| {
                let rows = diesel::update(
                    agent_assignments::table
                        .filter(agent_assignments::task_id.eq(task_id.into_inner()))
                        .filter(agent_assignments::status.eq(AssignmentStatus::Active.as_str())),
                )
                .set((
                    agent_assignments::status.eq(status.as_str()),
                    agent_assignments::completed_at.eq(Some(at)),
                ))
                .returning(AssignmentRow::as_returning())
                .get_results::<AssignmentRow>(tx)?;

                for row in &rows {
                    diesel::update(
                        agents::table
                            .filter(agents::id.eq(row.agent_id))
                            .filter(agents::current_workload.gt(0)),
                    )
                    .set(agents::current_workload.eq(agents::current_workload - 1))
                    .execute(tx)?;
                }

                let mut released = rows
                    .into_iter()
                    .map(row_to_assignment)
                    .collect::<AgentRepositoryResult<Vec<_>>>()?;
                released.sort_by_key(AgentAssignment::id);
                Ok(released)
            })
        })
        .await
    }

    async fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> AgentRepositoryResult<Vec<AgentAssignment>> {
        self.run_blocking(move |connection| {
            let mut query = agent_assignments::table.into_boxed();
            if let Some(agent_id) = filter.agent_id {
                query = query.filter(agent_assignments::agent_id.eq(agent_id.into_inner()));
            }
            if let Some(task_id) = filter.task_id {
                query = query.filter(agent_assignments::task_id.eq(task_id.into_inner()));
            }
            if let Some(status) = filter.status {
                query = query.filter(agent_assignments::status.eq(status.as_str()));
            }
            query
                .order((
                    agent_assignments::assigned_at.desc(),
                    agent_assignments::id.asc(),
                ))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)?
                .into_iter()
                .map(row_to_assignment)
                .collect()
        })
        .await
    }
}

fn holds_task(
    connection: &mut PgConnection,
    agent_id: AgentId,
    task_id: TaskId,
) -> AgentRepositoryResult<bool> {
    let held = agent_assignments::table
        .filter(agent_assignments::agent_id.eq(agent_id.into_inner()))
        .filter(agent_assignments::task_id.eq(task_id.into_inner()))
        .filter(agent_assignments::status.eq(AssignmentStatus::Active.as_str()))
        .count()
        .get_result::<i64>(connection)?;
    Ok(held > 0)
}

fn to_agent_row(agent: &Agent) -> AgentRepositoryResult<AgentRow> {
    Ok(AgentRow {
        id: agent.id().into_inner(),
        name: agent.name().to_owned(),
        email: agent.email().to_owned(),
        role: agent.role().to_owned(),
        status: agent.status().as_str().to_owned(),
        current_workload: i32::try_from(agent.current_workload())
            .map_err(AgentRepositoryError::persistence)?,
        max_workload: i32::try_from(agent.max_workload())
            .map_err(AgentRepositoryError::persistence)?,
        skills: serde_json::to_value(agent.skills()).map_err(AgentRepositoryError::persistence)?,
        created_at: agent.created_at(),
    })
}

fn row_to_agent(row: AgentRow) -> AgentRepositoryResult<Agent> {
    let status =
        AgentStatus::try_from(row.status.as_str()).map_err(AgentRepositoryError::persistence)?;
    let skills = serde_json::from_value::<Vec<String>>(row.skills)
        .map_err(AgentRepositoryError::persistence)?;
    Ok(Agent::from_persisted(PersistedAgentData {
        id: AgentId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        role: row.role,
        status,
        current_workload: u32::try_from(row.current_workload)
            .map_err(AgentRepositoryError::persistence)?,
        max_workload: u32::try_from(row.max_workload)
            .map_err(AgentRepositoryError::persistence)?,
        skills,
        created_at: row.created_at,
    }))
}

fn to_assignment_row(assignment: &AgentAssignment) -> AssignmentRow {
    AssignmentRow {
        id: assignment.id().into_inner(),
        agent_id: assignment.agent_id().into_inner(),
        task_id: assignment.task_id().into_inner(),
        assigned_by: assignment.assigned_by().to_owned(),
        assigned_at: assignment.assigned_at(),
        status: assignment.status().as_str().to_owned(),
        completed_at: assignment.completed_at(),
    }
}

fn row_to_assignment(row: AssignmentRow) -> AgentRepositoryResult<AgentAssignment> {
    let status = AssignmentStatus::try_from(row.status.as_str())
        .map_err(AgentRepositoryError::persistence)?;
    Ok(AgentAssignment::from_persisted(PersistedAssignmentData {
        id: AssignmentId::from_uuid(row.id),
        agent_id: AgentId::from_uuid(row.agent_id),
        task_id: TaskId::from_uuid(row.task_id),
        assigned_by: row.assigned_by,
        assigned_at: row.assigned_at,
        status,
        completed_at: row.completed_at,
    }))
}
