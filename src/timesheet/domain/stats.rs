//! Aggregate time statistics for one agent.

use super::TimeEntry;
use serde::{Deserialize, Serialize};

/// Totals over an agent's stopped time entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTimeStats {
    /// Number of stopped entries.
    pub total_entries: u64,
    /// Sum of whole minutes.
    pub total_minutes: u64,
    /// Mean whole minutes per entry, rounded down; zero with no entries.
    pub average_minutes: u64,
}

impl AgentTimeStats {
    /// Aggregates the stopped entries in `entries`; running ones are ignored.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> Self {
        let (total_entries, total_minutes) = entries
            .into_iter()
            .filter_map(TimeEntry::duration_minutes)
            .fold((0_u64, 0_u64), |(count, minutes), duration| {
                (
                    count.saturating_add(1),
                    minutes.saturating_add(u64::from(duration)),
                )
            });
        Self {
            total_entries,
            total_minutes,
            average_minutes: total_minutes.checked_div(total_entries).unwrap_or(0),
        }
    }
}
