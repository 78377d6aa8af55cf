//! Treasury board: a kanban coordination service for agent teams.
//!
//! Tasks live in ordered columns, get assigned to agents within their
//! capacity, and can be created from externally reported issues. A read-side
//! layer derives board views, progress and analytics, and a worker protocol
//! exchanges assignment requests and live activity with an external process.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Repository traits the services depend on
//! - **Services**: Orchestration over ports and an injected clock
//!
//! The [`store`] module provides in-memory and `PostgreSQL` adapters that
//! implement every port.
//!
//! # Modules
//!
//! - [`board`]: Columns, tasks, file diffs and position reconciliation
//! - [`agent`]: Agent roster, capacity and assignments
//! - [`intake`]: Issue ingestion and conversion into tasks
//! - [`timesheet`]: Time tracking per agent and task
//! - [`insights`]: Board view, progress, statistics and analytics
//! - [`worker`]: Wire protocol and dispatch to the external agent worker
//! - [`workflow`]: Cross-context board operations
//! - [`config`]: Column conventions and templates loaded from TOML

pub mod agent;
pub mod board;
pub mod config;
pub mod insights;
pub mod intake;
pub mod store;
pub mod timesheet;
pub mod worker;
pub mod workflow;
