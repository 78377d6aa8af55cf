//! Boundary to the external agent-worker process.
//!
//! Only the message contract and a gateway port live here; the transport is
//! supplied by the embedding application. [`WorkerDispatch`] turns gateway
//! failures into [`WorkerAssignment::Unavailable`] so callers degrade to
//! manual assignment.

mod dispatch;
mod gateway;
pub mod protocol;

pub use dispatch::{ActivityFeed, DEFAULT_FEED_CAPACITY, WorkerAssignment, WorkerDispatch};
pub use gateway::{AgentWorkerGateway, GatewayError};
pub use protocol::{
    AgentUpdate, ProtocolError, TaskAnalysis, TaskAssignmentRequest, TaskAssignmentResult,
    WorkerMessage,
};

#[cfg(test)]
mod tests;
