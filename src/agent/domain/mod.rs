//! Domain model for agents, their capacity and their assignments.

mod agent;
mod assignment;
mod error;
mod ids;
pub mod selection;

pub use agent::{Agent, AgentProfile, AgentStatus, PersistedAgentData};
pub use assignment::{
    AgentAssignment, AssignmentResolution, AssignmentStatus, PersistedAssignmentData,
};
pub use error::{AgentDomainError, ParseAgentStatusError, ParseAssignmentStatusError};
pub use ids::{AgentId, AssignmentId};
