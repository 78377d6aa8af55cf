//! Analytics report over tasks, assignments and tracked time.
//!
//! All figures are integers. Percentages are clamped to `0..=100` and
//! averages round down.

use super::statistics::BoardStatistics;
use crate::agent::domain::{Agent, AgentAssignment, AgentId, AssignmentStatus};
use crate::board::domain::Task;
use crate::timesheet::domain::AgentTimeStats;
use chrono::{DateTime, Datelike, Duration, IsoWeek, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Length of the velocity window in days.
pub const VELOCITY_WINDOW_DAYS: i64 = 7;

/// Number of ISO weeks in the progress series, current week included.
pub const PROGRESS_WEEKS: u32 = 4;

/// Performance figures for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentPerformance {
    /// The agent.
    pub agent_id: AgentId,
    /// The agent's name.
    pub name: String,
    /// Assignments the agent completed.
    pub completed_assignments: usize,
    /// Mean minutes per stopped time entry.
    pub average_minutes: u64,
    /// Completed assignments relative to capacity, `0..=100`.
    pub efficiency_percent: u32,
}

/// Tasks created and completed during one ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyProgress {
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number.
    pub week: u32,
    /// Tasks created during the week.
    pub tasks_created: usize,
    /// Assignments completed during the week.
    pub tasks_completed: usize,
}

/// Full analytics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    /// Headline board counts.
    pub statistics: BoardStatistics,
    /// Per-agent figures, ordered by name.
    pub agent_performance: Vec<AgentPerformance>,
    /// Assignments completed within the velocity window.
    pub team_velocity: usize,
    /// Mean minutes from assignment to completion, if anything completed.
    pub average_completion_minutes: Option<i64>,
    /// Oldest week first.
    pub weekly_progress: Vec<WeeklyProgress>,
}

/// Committed data the report is computed from.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsInput<'a> {
    /// Every task.
    pub tasks: &'a [Task],
    /// Every agent.
    pub agents: &'a [Agent],
    /// Every assignment.
    pub assignments: &'a [AgentAssignment],
    /// Time totals keyed by agent.
    pub time_stats: &'a HashMap<AgentId, AgentTimeStats>,
    /// Role whose agents are left out of performance figures.
    pub excluded_role: &'a str,
    /// Reference instant.
    pub now: DateTime<Utc>,
}

/// Builds the analytics report.
#[must_use]
pub fn build_analytics(input: &AnalyticsInput<'_>, statistics: BoardStatistics) -> AnalyticsReport {
    let completed: Vec<&AgentAssignment> = input
        .assignments
        .iter()
        .filter(|assignment| assignment.status() == AssignmentStatus::Completed)
        .collect();

    AnalyticsReport {
        statistics,
        agent_performance: agent_performance(input, &completed),
        team_velocity: team_velocity(&completed, input.now),
        average_completion_minutes: average_completion_minutes(&completed),
        weekly_progress: weekly_progress(input.tasks, &completed, input.now.date_naive()),
    }
}

fn agent_performance(
    input: &AnalyticsInput<'_>,
    completed: &[&AgentAssignment],
) -> Vec<AgentPerformance> {
    let mut rows: Vec<AgentPerformance> = input
        .agents
        .iter()
        .filter(|agent| !agent.has_role(input.excluded_role))
        .map(|agent| {
            let done = completed
                .iter()
                .filter(|assignment| assignment.agent_id() == agent.id())
                .count();
            let done_units = u32::try_from(done).unwrap_or(u32::MAX);
            AgentPerformance {
                agent_id: agent.id(),
                name: agent.name().to_owned(),
                completed_assignments: done,
                average_minutes: input
                    .time_stats
                    .get(&agent.id())
                    .map_or(0, |stats| stats.average_minutes),
                efficiency_percent: done_units
                    .saturating_mul(100)
                    .checked_div(agent.max_workload())
                    .unwrap_or(0)
                    .min(100),
            }
        })
        .collect();
    rows.sort_by(|left, right| {
        left.name
            .cmp(&right.name)
            .then_with(|| left.agent_id.cmp(&right.agent_id))
    });
    rows
}

fn team_velocity(completed: &[&AgentAssignment], now: DateTime<Utc>) -> usize {
    let window_start = now - Duration::days(VELOCITY_WINDOW_DAYS);
    completed
        .iter()
        .filter_map(|assignment| assignment.completed_at())
        .filter(|done| *done >= window_start && *done <= now)
        .count()
}

fn average_completion_minutes(completed: &[&AgentAssignment]) -> Option<i64> {
    let lead_times: Vec<i64> = completed
        .iter()
        .filter_map(|assignment| assignment.lead_time_minutes())
        .collect();
    let count = i64::try_from(lead_times.len()).ok()?;
    lead_times
        .iter()
        .fold(0_i64, |sum, minutes| sum.saturating_add(*minutes))
        .checked_div(count)
}

fn weekly_progress(
    tasks: &[Task],
    completed: &[&AgentAssignment],
    today: NaiveDate,
) -> Vec<WeeklyProgress> {
    (0..PROGRESS_WEEKS)
        .rev()
        .map(|weeks_back| {
            let day = today - Duration::weeks(i64::from(weeks_back));
            let week = day.iso_week();
            WeeklyProgress {
                year: week.year(),
                week: week.week(),
                tasks_created: tasks
                    .iter()
                    .filter(|task| same_week(task.created_at(), week))
                    .count(),
                tasks_completed: completed
                    .iter()
                    .filter_map(|assignment| assignment.completed_at())
                    .filter(|done| same_week(*done, week))
                    .count(),
            }
        })
        .collect()
}

fn same_week(instant: DateTime<Utc>, week: IsoWeek) -> bool {
    instant.date_naive().iso_week() == week
}
