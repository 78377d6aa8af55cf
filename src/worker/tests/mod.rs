//! Unit tests for the worker protocol and dispatch.
