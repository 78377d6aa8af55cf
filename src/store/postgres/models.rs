//! Diesel row models for the board store.

use super::schema::{
    agent_assignments, agents, file_diffs, issues, kanban_columns, tasks, time_entries,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = kanban_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Display title.
    pub title: String,
    /// Board-layout position.
    pub position: i32,
    /// Display colour.
    pub color: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for columns.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = kanban_columns)]
pub struct NewColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Display title.
    pub title: String,
    /// Board-layout position.
    pub position: i32,
    /// Display colour.
    pub color: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Title.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub title: String,
    /// Optional description.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub description: Option<String>,
    /// Owning column.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub column_id: uuid::Uuid,
    /// Position within the column.
    #[diesel(sql_type = diesel::sql_types::Int4)]
    pub position: i32,
    /// Priority label.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub priority: String,
    /// Free-text assignee label.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub assignee: Option<String>,
    /// Optional due date.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Date>)]
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for tasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owning column.
    pub column_id: uuid::Uuid,
    /// Position within the column.
    pub position: i32,
    /// Priority label.
    pub priority: String,
    /// Free-text assignee label.
    pub assignee: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the editable task fields.
///
/// `treat_none_as_null` lets a patch clear optional fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskFieldsChangeset {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority label.
    pub priority: String,
    /// Free-text assignee label.
    pub assignee: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for file diffs.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = file_diffs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FileDiffRow {
    /// Diff identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Changed file path.
    pub file_path: String,
    /// Content before the change.
    pub old_content: Option<String>,
    /// Content after the change.
    pub new_content: Option<String>,
    /// Unified diff text.
    pub diff_content: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result and insert row for agents.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentRow {
    /// Agent identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Role.
    pub role: String,
    /// Availability label.
    pub status: String,
    /// Count of active assignments.
    pub current_workload: i32,
    /// Capacity.
    pub max_workload: i32,
    /// Skill tags as a JSON array.
    pub skills: Value,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result and insert row for assignments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = agent_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: uuid::Uuid,
    /// Assigned agent.
    pub agent_id: uuid::Uuid,
    /// Assigned task.
    pub task_id: uuid::Uuid,
    /// Who made the assignment.
    pub assigned_by: String,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Lifecycle label.
    pub status: String,
    /// Resolution timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query result and insert row for issues.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IssueRow {
    /// Issue identifier.
    pub id: uuid::Uuid,
    /// External tracker identifier.
    pub external_id: String,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Severity label.
    pub severity: String,
    /// Optional category.
    pub category: Option<String>,
    /// Optional reporter.
    pub reporter: Option<String>,
    /// Optional report date.
    pub reported_date: Option<NaiveDate>,
    /// Optional affected system.
    pub affected_system: Option<String>,
    /// Optional reproduction steps.
    pub reproduction_steps: Option<String>,
    /// Optional expected behaviour.
    pub expected_behavior: Option<String>,
    /// Optional actual behaviour.
    pub actual_behavior: Option<String>,
    /// Triage label.
    pub status: String,
    /// Board selection flag.
    pub selected_for_kanban: bool,
    /// Task created from the issue.
    pub kanban_task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for time entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = time_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Task worked on.
    pub task_id: uuid::Uuid,
    /// Agent who worked.
    pub agent_id: uuid::Uuid,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// End timestamp.
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole minutes worked.
    pub duration_minutes: Option<i32>,
    /// Optional note.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
