//! Per-agent progress over assigned tasks.

use crate::agent::domain::{Agent, AgentAssignment, AssignmentStatus};
use crate::board::domain::{ColumnId, Task, TaskId};
use serde::Serialize;
use std::collections::HashMap;

/// One assignment as shown on an agent's progress card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentProgress {
    /// The assignment.
    pub assignment: AgentAssignment,
    /// Title of the assigned task.
    pub task_title: String,
    /// Whether the task sits in the terminal column.
    pub completed: bool,
}

/// An agent's progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProgress {
    /// The agent.
    pub agent: Agent,
    /// Non-cancelled assignments, most recent first.
    pub assignments: Vec<AssignmentProgress>,
    /// Assignments whose task is in the terminal column.
    pub completed_tasks: usize,
    /// Number of non-cancelled assignments.
    pub total_tasks: usize,
    /// Current workload as a percentage of capacity, `0..=100`.
    pub workload_percent: u32,
}

/// Summarises `agent`'s non-cancelled assignments.
///
/// Assignments whose task is absent from `tasks` are left out.
#[must_use]
pub fn agent_progress(
    agent: Agent,
    assignments: Vec<AgentAssignment>,
    tasks: &[Task],
    terminal: Option<ColumnId>,
) -> AgentProgress {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();
    let mut rows: Vec<AssignmentProgress> = assignments
        .into_iter()
        .filter(|assignment| {
            assignment.agent_id() == agent.id()
                && assignment.status() != AssignmentStatus::Cancelled
        })
        .filter_map(|assignment| {
            let task = by_id.get(&assignment.task_id())?;
            Some(AssignmentProgress {
                task_title: task.title().to_owned(),
                completed: terminal.is_some_and(|column| task.column_id() == column),
                assignment,
            })
        })
        .collect();
    rows.sort_by(|left, right| {
        right
            .assignment
            .assigned_at()
            .cmp(&left.assignment.assigned_at())
            .then_with(|| left.assignment.id().cmp(&right.assignment.id()))
    });

    let completed_tasks = rows.iter().filter(|row| row.completed).count();
    AgentProgress {
        workload_percent: agent.workload_percent(),
        total_tasks: rows.len(),
        completed_tasks,
        assignments: rows,
        agent,
    }
}
