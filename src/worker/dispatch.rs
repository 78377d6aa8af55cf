//! Degrading dispatch to the agent worker and the recent-activity feed.

use super::gateway::AgentWorkerGateway;
use super::protocol::{
    AgentUpdate, ProtocolError, TaskAssignmentRequest, TaskAssignmentResult, WorkerMessage,
};
use crate::board::domain::{Task, TaskId};
use crate::config::BoardConfig;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of updates kept by [`ActivityFeed`].
pub const DEFAULT_FEED_CAPACITY: usize = 10;

/// Outcome of offering a task to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerAssignment {
    /// An agent accepted the task.
    Accepted(TaskAssignmentResult),
    /// The worker answered but no agent took the task.
    Declined(TaskAssignmentResult),
    /// The worker could not be reached; callers fall back to manual
    /// assignment.
    Unavailable {
        /// Why the worker was unreachable.
        reason: String,
    },
}

impl WorkerAssignment {
    /// Returns the accepting agent's name, if any.
    #[must_use]
    pub fn assigned_agent(&self) -> Option<&str> {
        match self {
            Self::Accepted(result) => result.assigned_agent.as_deref(),
            Self::Declined(_) | Self::Unavailable { .. } => None,
        }
    }
}

/// Sends work to the agent worker without ever failing the caller.
#[derive(Clone)]
pub struct WorkerDispatch<G>
where
    G: AgentWorkerGateway,
{
    gateway: Arc<G>,
}

impl<G> WorkerDispatch<G>
where
    G: AgentWorkerGateway,
{
    /// Creates a dispatcher over `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Offers `task` to the worker.
    pub async fn dispatch_task(&self, task: &Task, category: Option<String>) -> WorkerAssignment {
        let request = TaskAssignmentRequest::for_task(task, category);
        match self.gateway.request_assignment(&request).await {
            Ok(result) if result.success => {
                info!(
                    task_id = %task.id(),
                    agent = result.assigned_agent.as_deref().unwrap_or("unknown"),
                    "worker accepted task"
                );
                WorkerAssignment::Accepted(result)
            }
            Ok(result) => {
                debug!(task_id = %task.id(), reason = ?result.reason, "worker declined task");
                WorkerAssignment::Declined(result)
            }
            Err(err) => {
                warn!(task_id = %task.id(), error = %err, "agent worker unavailable");
                WorkerAssignment::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Asks the worker for a progress note; returns whether the request was
    /// delivered.
    pub async fn request_update(&self, task_id: TaskId, agent_id: Option<String>) -> bool {
        match self.gateway.request_update(task_id, agent_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(task_id = %task_id, error = %err, "could not request agent update");
                false
            }
        }
    }
}

/// Bounded list of the most recent agent updates.
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    capacity: usize,
    entries: VecDeque<AgentUpdate>,
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }
}

impl ActivityFeed {
    /// Creates a feed keeping at most `capacity` updates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Creates a feed sized by [`BoardConfig::activity_feed_capacity`].
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self::with_capacity(config.activity_feed_capacity)
    }

    /// Records the update carried by `message`; returns whether one was
    /// recorded.
    pub fn record(&mut self, message: &WorkerMessage) -> bool {
        let Some(update) = message.agent_update() else {
            return false;
        };
        if self.capacity == 0 {
            return false;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(update.clone());
        true
    }

    /// Decodes raw worker text and records any update it carries.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] when the text is not a worker message.
    pub fn ingest(&mut self, raw: &str) -> Result<WorkerMessage, ProtocolError> {
        let message = WorkerMessage::decode(raw)?;
        self.record(&message);
        Ok(message)
    }

    /// Returns the kept updates, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &AgentUpdate> {
        self.entries.iter()
    }

    /// Returns the number of kept updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no update is kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
