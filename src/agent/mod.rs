//! Agents, their bounded capacity and task assignments.
//!
//! - Domain types and candidate ranking in [`domain`]
//! - Port contracts in [`ports`]
//! - Roster and assignment orchestration in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
