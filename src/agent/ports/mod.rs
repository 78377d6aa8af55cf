//! Port contracts for agents and assignments.

pub mod repository;

pub use repository::{
    AgentRepository, AgentRepositoryError, AgentRepositoryResult, AssignmentFilter,
};
