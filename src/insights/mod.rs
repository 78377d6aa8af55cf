//! Read-side aggregators.
//!
//! The aggregation functions are pure transforms over committed rows;
//! [`InsightsService`] loads those rows from a store and applies them.

pub mod analytics;
pub mod board_view;
pub mod progress;
mod service;
pub mod statistics;

pub use analytics::{AgentPerformance, AnalyticsReport, WeeklyProgress};
pub use board_view::{BoardView, ColumnView};
pub use progress::{AgentProgress, AssignmentProgress};
pub use service::{InsightsError, InsightsResult, InsightsService};
pub use statistics::{BoardStatistics, PriorityHistogram};

#[cfg(test)]
mod tests;
