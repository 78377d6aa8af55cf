//! Append-only file diff records attached to tasks.

use super::{BoardDomainError, FileDiffId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A file change recorded against a task, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    id: FileDiffId,
    task_id: TaskId,
    file_path: String,
    old_content: Option<String>,
    new_content: Option<String>,
    diff_content: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFileDiffData {
    /// Persisted identifier.
    pub id: FileDiffId,
    /// Owning task.
    pub task_id: TaskId,
    /// Path of the changed file.
    pub file_path: String,
    /// Content before the change.
    pub old_content: Option<String>,
    /// Content after the change.
    pub new_content: Option<String>,
    /// Unified diff text.
    pub diff_content: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl FileDiff {
    /// Creates a diff record for `file_path` owned by `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyFilePath`] if the path is blank.
    pub fn new(
        task_id: TaskId,
        file_path: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, BoardDomainError> {
        let raw_path = file_path.into();
        let normalized = raw_path.trim();
        if normalized.is_empty() {
            return Err(BoardDomainError::EmptyFilePath);
        }
        Ok(Self {
            id: FileDiffId::new(),
            task_id,
            file_path: normalized.to_owned(),
            old_content: None,
            new_content: None,
            diff_content: None,
            created_at: clock.utc(),
        })
    }

    /// Sets the content before the change.
    #[must_use]
    pub fn with_old_content(mut self, content: impl Into<String>) -> Self {
        self.old_content = Some(content.into());
        self
    }

    /// Sets the content after the change.
    #[must_use]
    pub fn with_new_content(mut self, content: impl Into<String>) -> Self {
        self.new_content = Some(content.into());
        self
    }

    /// Sets the unified diff text.
    #[must_use]
    pub fn with_diff_content(mut self, content: impl Into<String>) -> Self {
        self.diff_content = Some(content.into());
        self
    }

    /// Reconstructs a diff from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedFileDiffData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            file_path: data.file_path,
            old_content: data.old_content,
            new_content: data.new_content,
            diff_content: data.diff_content,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> FileDiffId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the changed file path.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Returns the content before the change.
    #[must_use]
    pub fn old_content(&self) -> Option<&str> {
        self.old_content.as_deref()
    }

    /// Returns the content after the change.
    #[must_use]
    pub fn new_content(&self) -> Option<&str> {
        self.new_content.as_deref()
    }

    /// Returns the unified diff text.
    #[must_use]
    pub fn diff_content(&self) -> Option<&str> {
        self.diff_content.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
