//! Unit tests for the read-side aggregators.
