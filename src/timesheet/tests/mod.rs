//! Unit tests for time tracking.
