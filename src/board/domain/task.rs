//! Task aggregate root and its editable field set.

use super::{BoardDomainError, ColumnId, ParsePriorityError, Position, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal scheduling.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Validated content for a task that has not been placed on the board yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
    priority: Priority,
    assignee: Option<String>,
    due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Creates a draft with the required title and medium priority.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] if the title is blank.
    pub fn new(title: impl Into<String>) -> Result<Self, BoardDomainError> {
        Ok(Self {
            title: normalize_title(title.into())?,
            description: None,
            priority: Priority::default(),
            assignee: None,
            due_date: None,
        })
    }

    /// Sets the task description; blank values are dropped.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_optional(description.into());
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the free-text assignee label; blank values are dropped.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = normalize_optional(assignee.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the draft title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Explicit set of updatable task fields.
///
/// Each field is optional; `None` leaves the stored value untouched. Nested
/// options distinguish "set" (`Some(Some(_))`) from "clear" (`Some(None)`).
/// Column and position are deliberately absent: they only change through the
/// position reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    title: Option<String>,
    description: Option<Option<String>>,
    priority: Option<Priority>,
    assignee: Option<Option<String>>,
    due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description.and_then(normalize_optional));
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the assignee label.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = Some(assignee.and_then(normalize_optional));
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    column_id: ColumnId,
    position: Position,
    priority: Priority,
    assignee: Option<String>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted owning column.
    pub column_id: ColumnId,
    /// Persisted position within the column.
    pub position: Position,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted assignee label.
    pub assignee: Option<String>,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Places a draft on the board at `position` within `column_id`.
    #[must_use]
    pub fn new(
        draft: TaskDraft,
        column_id: ColumnId,
        position: Position,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            column_id,
            position,
            priority: draft.priority,
            assignee: draft.assignee,
            due_date: draft.due_date,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            column_id: data.column_id,
            position: data.position,
            priority: data.priority,
            assignee: data.assignee,
            due_date: data.due_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning column.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the position within the owning column.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the assignee label, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the task is past due on `today`.
    #[must_use]
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }

    /// Applies a typed patch.
    ///
    /// The patch is validated before any field changes, so a rejected patch
    /// leaves the task untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] when the patch sets a
    /// blank title.
    pub fn apply_patch(
        &mut self,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        let TaskPatch {
            title,
            description,
            priority,
            assignee,
            due_date,
        } = patch;
        let normalized_title = title.map(normalize_title).transpose()?;

        if let Some(new_title) = normalized_title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_priority) = priority {
            self.priority = new_priority;
        }
        if let Some(new_assignee) = assignee {
            self.assignee = new_assignee;
        }
        if let Some(new_due_date) = due_date {
            self.due_date = new_due_date;
        }
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Moves the task to `(column_id, position)`.
    ///
    /// Only stores call this while applying a reconciled batch.
    pub fn reposition(&mut self, column_id: ColumnId, position: Position, at: DateTime<Utc>) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = at;
    }
}

fn normalize_title(raw: String) -> Result<String, BoardDomainError> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(BoardDomainError::EmptyTaskTitle);
    }
    Ok(normalized.to_owned())
}

fn normalize_optional(raw: String) -> Option<String> {
    let normalized = raw.trim();
    (!normalized.is_empty()).then(|| normalized.to_owned())
}
