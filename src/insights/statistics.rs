//! Headline board statistics.

use crate::board::domain::{ColumnId, Priority, Task};
use chrono::NaiveDate;
use serde::Serialize;

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityHistogram {
    /// Low-priority tasks.
    pub low: usize,
    /// Medium-priority tasks.
    pub medium: usize,
    /// High-priority tasks.
    pub high: usize,
}

impl PriorityHistogram {
    fn record(&mut self, priority: Priority) {
        let bucket = match priority {
            Priority::Low => &mut self.low,
            Priority::Medium => &mut self.medium,
            Priority::High => &mut self.high,
        };
        *bucket = bucket.saturating_add(1);
    }
}

/// Headline counts over the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStatistics {
    /// Every task on the board.
    pub total_tasks: usize,
    /// Tasks in the terminal column.
    pub completed_tasks: usize,
    /// Tasks in the in-progress column.
    pub in_progress_tasks: usize,
    /// Tasks past due and not in the terminal column.
    pub overdue_tasks: usize,
    /// Tasks per priority.
    pub priorities: PriorityHistogram,
}

/// Computes statistics for `tasks` as of `today`.
#[must_use]
pub fn board_statistics(
    tasks: &[Task],
    terminal: Option<ColumnId>,
    in_progress: Option<ColumnId>,
    today: NaiveDate,
) -> BoardStatistics {
    let in_column =
        |task: &Task, column: Option<ColumnId>| column.is_some_and(|id| task.column_id() == id);

    let mut stats = BoardStatistics {
        total_tasks: tasks.len(),
        ..BoardStatistics::default()
    };
    for task in tasks {
        let done = in_column(task, terminal);
        if done {
            stats.completed_tasks = stats.completed_tasks.saturating_add(1);
        }
        if in_column(task, in_progress) {
            stats.in_progress_tasks = stats.in_progress_tasks.saturating_add(1);
        }
        if !done && task.is_overdue_on(today) {
            stats.overdue_tasks = stats.overdue_tasks.saturating_add(1);
        }
        stats.priorities.record(task.priority());
    }
    stats
}
