//! Domain model for time tracking.

mod entry;
mod stats;

pub use entry::{PersistedTimeEntryData, TimeEntry, TimeEntryId, TimesheetDomainError};
pub use stats::AgentTimeStats;
