//! Domain model for the kanban board.
//!
//! Columns, tasks and their file diffs, plus the pure position reconciler
//! that keeps per-column ordinals dense. Persistence lives behind the
//! [`crate::board::ports`] boundary.

mod column;
mod error;
mod file_diff;
mod ids;
pub mod position;
mod task;

pub use column::{Column, DEFAULT_COLUMN_COLOR, PersistedColumnData};
pub use error::{BoardDomainError, ParsePriorityError};
pub use file_diff::{FileDiff, PersistedFileDiffData};
pub use ids::{ColumnId, FileDiffId, TaskId};
pub use position::{MovePlan, Position, PositionUpdate};
pub use task::{PersistedTaskData, Priority, Task, TaskDraft, TaskPatch};
