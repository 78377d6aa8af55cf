//! Kanban board: columns, tasks, file diffs and position reconciliation.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types and the pure position reconciler in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]
//!
//! Storage adapters implementing [`ports::BoardRepository`] live in
//! [`crate::store`].

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
