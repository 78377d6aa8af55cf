//! Application services for time tracking.

mod tracking;

pub use tracking::{TimeTrackingError, TimeTrackingResult, TimeTrackingService};
