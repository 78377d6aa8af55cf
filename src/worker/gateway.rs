//! Port to the external agent-worker process.

use super::protocol::{TaskAssignmentRequest, TaskAssignmentResult};
use crate::board::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures reaching the worker.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No connection to the worker is open.
    #[error("agent worker is not connected")]
    Disconnected,

    /// The worker did not answer in time.
    #[error("agent worker did not answer")]
    NoReply,

    /// Transport-level failure.
    #[error("agent worker transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl GatewayError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Transport-agnostic channel to the agent worker.
#[async_trait]
pub trait AgentWorkerGateway: Send + Sync {
    /// Sends an assignment request and waits for the decision.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the worker cannot be reached.
    async fn request_assignment(
        &self,
        request: &TaskAssignmentRequest,
    ) -> Result<TaskAssignmentResult, GatewayError>;

    /// Asks an agent for a progress note; the note arrives asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the worker cannot be reached.
    async fn request_update(
        &self,
        task_id: TaskId,
        agent_id: Option<String>,
    ) -> Result<(), GatewayError>;
}
