//! Board column entity.

use super::{BoardDomainError, ColumnId, Position};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fallback colour applied when a column is created without one.
pub const DEFAULT_COLUMN_COLOR: &str = "#64748b";

/// A named, ordered bucket of tasks representing one board stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    title: String,
    position: Position,
    color: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Persisted column title.
    pub title: String,
    /// Persisted board-layout position.
    pub position: Position,
    /// Persisted display colour.
    pub color: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new column at the given board position.
    ///
    /// A blank colour falls back to [`DEFAULT_COLUMN_COLOR`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyColumnTitle`] when the title is blank.
    pub fn new(
        title: impl Into<String>,
        color: impl Into<String>,
        position: Position,
        clock: &impl Clock,
    ) -> Result<Self, BoardDomainError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(BoardDomainError::EmptyColumnTitle);
        }

        let raw_color = color.into();
        let normalized_color = raw_color.trim();
        let resolved_color = if normalized_color.is_empty() {
            DEFAULT_COLUMN_COLOR
        } else {
            normalized_color
        };

        Ok(Self {
            id: ColumnId::new(),
            title: normalized_title.to_owned(),
            position,
            color: resolved_color.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            position: data.position,
            color: data.color,
            created_at: data.created_at,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the column title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the board-layout position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the display colour.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the title matches `label`, ignoring case and padding.
    #[must_use]
    pub fn has_title(&self, label: &str) -> bool {
        self.title.eq_ignore_ascii_case(label.trim())
    }
}
