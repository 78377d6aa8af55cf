//! Unit tests for issue intake.
