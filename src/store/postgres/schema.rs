//! Diesel schema for the board store.

diesel::table! {
    /// Board columns.
    kanban_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Display title.
        #[max_length = 255]
        title -> Varchar,
        /// Board-layout position.
        position -> Int4,
        /// Display colour.
        #[max_length = 32]
        color -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks placed on the board.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Owning column.
        column_id -> Uuid,
        /// Dense position within the column.
        position -> Int4,
        /// Priority label.
        #[max_length = 16]
        priority -> Varchar,
        /// Free-text assignee label.
        #[max_length = 255]
        assignee -> Nullable<Varchar>,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// File diffs attached to tasks.
    file_diffs (id) {
        /// Diff identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Changed file path.
        file_path -> Text,
        /// Content before the change.
        old_content -> Nullable<Text>,
        /// Content after the change.
        new_content -> Nullable<Text>,
        /// Unified diff text.
        diff_content -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Agent roster.
    agents (id) {
        /// Agent identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Unique email.
        #[max_length = 255]
        email -> Varchar,
        /// Role.
        #[max_length = 100]
        role -> Varchar,
        /// Availability label.
        #[max_length = 16]
        status -> Varchar,
        /// Count of active assignments.
        current_workload -> Int4,
        /// Capacity.
        max_workload -> Int4,
        /// Skill tags as a JSON array.
        skills -> Jsonb,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Agent-to-task assignments.
    agent_assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Assigned agent.
        agent_id -> Uuid,
        /// Assigned task.
        task_id -> Uuid,
        /// Who made the assignment.
        #[max_length = 255]
        assigned_by -> Varchar,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
        /// Lifecycle label.
        #[max_length = 16]
        status -> Varchar,
        /// Resolution timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Externally reported issues.
    issues (id) {
        /// Issue identifier.
        id -> Uuid,
        /// Unique external tracker identifier.
        #[max_length = 255]
        external_id -> Varchar,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Severity label.
        #[max_length = 16]
        severity -> Varchar,
        /// Optional category.
        #[max_length = 100]
        category -> Nullable<Varchar>,
        /// Optional reporter.
        #[max_length = 255]
        reporter -> Nullable<Varchar>,
        /// Optional report date.
        reported_date -> Nullable<Date>,
        /// Optional affected system.
        #[max_length = 255]
        affected_system -> Nullable<Varchar>,
        /// Optional reproduction steps.
        reproduction_steps -> Nullable<Text>,
        /// Optional expected behaviour.
        expected_behavior -> Nullable<Text>,
        /// Optional actual behaviour.
        actual_behavior -> Nullable<Text>,
        /// Triage label.
        #[max_length = 16]
        status -> Varchar,
        /// Board selection flag.
        selected_for_kanban -> Bool,
        /// Task created from the issue.
        kanban_task_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Time tracked by agents on tasks.
    time_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Task worked on.
        task_id -> Uuid,
        /// Agent who worked.
        agent_id -> Uuid,
        /// Start timestamp.
        started_at -> Timestamptz,
        /// End timestamp.
        ended_at -> Nullable<Timestamptz>,
        /// Whole minutes worked.
        duration_minutes -> Nullable<Int4>,
        /// Optional note.
        description -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> kanban_columns (column_id));
diesel::joinable!(file_diffs -> tasks (task_id));
diesel::joinable!(agent_assignments -> agents (agent_id));
diesel::joinable!(time_entries -> tasks (task_id));
diesel::joinable!(time_entries -> agents (agent_id));

diesel::allow_tables_to_appear_in_same_query!(
    kanban_columns,
    tasks,
    file_diffs,
    agents,
    agent_assignments,
    issues,
    time_entries,
);
