//! Position reconciliation for board columns.
//!
//! Every column keeps its tasks at the dense, zero-based ordinals
//! `0..n-1`. The functions in this module never mutate anything: they read a
//! snapshot of tasks and produce the ordered batch of [`PositionUpdate`]s a
//! store must apply atomically to keep that invariant after a task is moved
//! or removed.
//!
//! Members of a column are ordered by their current position, then by
//! creation time and identifier. The secondary keys only matter when a
//! snapshot already violates the invariant (for example after a concurrent
//! writer), in which case the reconciled batch also repairs it.

use super::{BoardDomainError, ColumnId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Zero-based ordinal of a task within its column (or of a column on the
/// board).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(u32);

impl Position {
    /// The first slot of a column.
    pub const FIRST: Self = Self(0);

    /// Creates a position from a raw ordinal.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Converts a list index into a position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::PositionOutOfRange`] when the index does
    /// not fit the persisted range.
    pub fn from_index(index: usize) -> Result<Self, BoardDomainError> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| BoardDomainError::PositionOutOfRange(index))
    }

    /// Returns the raw ordinal.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the ordinal as a list index.
    #[must_use]
    pub fn as_index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of a reconciled batch: place `task_id` at `position` in
/// `column_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Task being placed.
    pub task_id: TaskId,
    /// Column the task ends up in.
    pub column_id: ColumnId,
    /// Dense ordinal within that column.
    pub position: Position,
}

/// Reconciled outcome of moving one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    task_id: TaskId,
    from_column: ColumnId,
    to_column: ColumnId,
    final_position: Position,
    updates: Vec<PositionUpdate>,
}

impl MovePlan {
    /// Returns the moved task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the column the task leaves.
    #[must_use]
    pub const fn from_column(&self) -> ColumnId {
        self.from_column
    }

    /// Returns the column the task ends up in.
    #[must_use]
    pub const fn to_column(&self) -> ColumnId {
        self.to_column
    }

    /// Returns the clamped position the task ends up at.
    #[must_use]
    pub const fn final_position(&self) -> Position {
        self.final_position
    }

    /// Returns whether the task changes column.
    #[must_use]
    pub fn crosses_columns(&self) -> bool {
        self.from_column != self.to_column
    }

    /// Returns the rows whose placement changes, source column first.
    #[must_use]
    pub fn updates(&self) -> &[PositionUpdate] {
        &self.updates
    }

    /// Returns whether applying the plan would change nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Returns the position a task appended to a column of `column_len` tasks
/// receives.
///
/// # Errors
///
/// Returns [`BoardDomainError::PositionOutOfRange`] for columns too large to
/// address.
pub fn append_position(column_len: usize) -> Result<Position, BoardDomainError> {
    Position::from_index(column_len)
}

/// Plans moving `task_id` to `requested` within `destination`.
///
/// `snapshot` must contain at least every task of the source and destination
/// columns; tasks of other columns are ignored. The requested position is
/// clamped to `[0, len]` of the destination column without the moved task.
/// A same-column move is computed on one list (remove, then reinsert), never
/// as two independent re-indexings.
///
/// # Errors
///
/// Returns [`BoardDomainError::TaskNotInSnapshot`] when the task is absent
/// from the snapshot.
pub fn plan_move(
    snapshot: &[Task],
    task_id: TaskId,
    destination: ColumnId,
    requested: Position,
) -> Result<MovePlan, BoardDomainError> {
    let moving = snapshot
        .iter()
        .find(|task| task.id() == task_id)
        .ok_or(BoardDomainError::TaskNotInSnapshot(task_id))?;
    let source = moving.column_id();

    let mut updates = Vec::new();
    if source != destination {
        let remaining = ordered_members(snapshot, source, task_id);
        updates.extend(reindex(&remaining, source)?);
    }

    let mut lane = ordered_members(snapshot, destination, task_id);
    let index = requested.as_index().min(lane.len());
    lane.insert(index, moving);
    updates.extend(reindex(&lane, destination)?);

    Ok(MovePlan {
        task_id,
        from_column: source,
        to_column: destination,
        final_position: Position::from_index(index)?,
        updates,
    })
}

/// Plans the compaction of a column after `task_id` is removed from it.
///
/// # Errors
///
/// Returns [`BoardDomainError::TaskNotInSnapshot`] when the task is absent
/// from the snapshot.
pub fn plan_removal(
    snapshot: &[Task],
    task_id: TaskId,
) -> Result<Vec<PositionUpdate>, BoardDomainError> {
    let removed = snapshot
        .iter()
        .find(|task| task.id() == task_id)
        .ok_or(BoardDomainError::TaskNotInSnapshot(task_id))?;
    let column_id = removed.column_id();
    let remaining = ordered_members(snapshot, column_id, task_id);
    reindex(&remaining, column_id)
}

/// Returns whether the tasks of `column_id` occupy exactly `0..n-1`.
#[must_use]
pub fn is_dense(tasks: &[Task], column_id: ColumnId) -> bool {
    let mut positions: Vec<u32> = tasks
        .iter()
        .filter(|task| task.column_id() == column_id)
        .map(|task| task.position().value())
        .collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, value)| usize::try_from(*value).is_ok_and(|position| position == index))
}

/// Orders tasks the way a column displays them.
#[must_use]
pub fn display_order(left: &Task, right: &Task) -> Ordering {
    left.position()
        .cmp(&right.position())
        .then_with(|| left.created_at().cmp(&right.created_at()))
        .then_with(|| left.id().cmp(&right.id()))
}

fn ordered_members(snapshot: &[Task], column_id: ColumnId, excluded: TaskId) -> Vec<&Task> {
    let mut members: Vec<&Task> = snapshot
        .iter()
        .filter(|task| task.column_id() == column_id && task.id() != excluded)
        .collect();
    members.sort_by(|left, right| display_order(left, right));
    members
}

fn reindex(lane: &[&Task], column_id: ColumnId) -> Result<Vec<PositionUpdate>, BoardDomainError> {
    let mut updates = Vec::new();
    for (index, task) in lane.iter().enumerate() {
        let position = Position::from_index(index)?;
        if task.column_id() != column_id || task.position() != position {
            updates.push(PositionUpdate {
                task_id: task.id(),
                column_id,
                position,
            });
        }
    }
    Ok(updates)
}
