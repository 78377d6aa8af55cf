//! Column-ordered projection of the board.

use crate::board::domain::{Column, Task, position};
use serde::Serialize;
use std::collections::HashMap;

/// One column with its tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    /// The column.
    pub column: Column,
    /// Its tasks ordered by position.
    pub tasks: Vec<Task>,
}

/// The whole board in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Columns ordered by position.
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Returns the total number of tasks shown.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|view| view.tasks.len()).sum()
    }
}

/// Groups `tasks` under their columns.
///
/// Tasks referencing a column that is not in `columns` are left out.
#[must_use]
pub fn build_board_view(columns: Vec<Column>, tasks: Vec<Task>) -> BoardView {
    let mut grouped: HashMap<_, Vec<Task>> = HashMap::new();
    for task in tasks {
        grouped.entry(task.column_id()).or_default().push(task);
    }

    let mut ordered_columns = columns;
    ordered_columns.sort_by_key(Column::position);
    let views = ordered_columns
        .into_iter()
        .map(|column| {
            let mut column_tasks = grouped.remove(&column.id()).unwrap_or_default();
            column_tasks.sort_by(position::display_order);
            ColumnView {
                column,
                tasks: column_tasks,
            }
        })
        .collect();
    BoardView { columns: views }
}
