//! JSON message contract spoken with the external agent-worker process.
//!
//! Every message is an object tagged by `type`. Payload-carrying messages
//! nest their payload under `data`, except `request_update`, which carries
//! its fields inline:
//!
//! ```json
//! {"type": "task_assignment", "data": {"task_id": "…", "task_title": "…", …}}
//! {"type": "request_update", "task_id": "…", "agent_id": "data-analyst"}
//! {"type": "ping"}
//! ```

use crate::board::domain::{Priority, Task, TaskId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while encoding or decoding worker messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text is not a valid worker message.
    #[error("malformed worker message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Assignment request sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignmentRequest {
    /// Task to assign.
    pub task_id: TaskId,
    /// Task title.
    pub task_title: String,
    /// Task description, empty when unset.
    pub task_description: String,
    /// Task priority.
    pub priority: Priority,
    /// Free-text category hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TaskAssignmentRequest {
    /// Builds a request describing `task`.
    #[must_use]
    pub fn for_task(task: &Task, category: Option<String>) -> Self {
        Self {
            task_id: task.id(),
            task_title: task.title().to_owned(),
            task_description: task.description().unwrap_or_default().to_owned(),
            priority: task.priority(),
            category,
        }
    }
}

/// Worker-side analysis of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    /// Complexity label such as `low` or `high`.
    pub complexity: String,
    /// Effort estimate in hours; the worker sends fractional values.
    pub estimated_hours: f64,
    /// Skills the task calls for.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Agent the worker recommends.
    pub recommended_agent: String,
}

/// Worker answer to an assignment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignmentResult {
    /// Whether an agent accepted the task.
    pub success: bool,
    /// Name of the accepting agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    /// Free-text reply from the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_response: Option<String>,
    /// Analysis backing the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TaskAnalysis>,
    /// Why the task was not assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Progress note from an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUpdate {
    /// Task the note is about.
    pub task_id: TaskId,
    /// Agent that wrote it.
    pub agent_name: String,
    /// The note.
    #[serde(alias = "activity")]
    pub update: String,
    /// Worker-local timestamp, passed through for display.
    pub timestamp: String,
}

/// A message exchanged with the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// Request an agent for a task.
    TaskAssignment {
        /// Request payload.
        data: TaskAssignmentRequest,
    },
    /// Assignment decision.
    TaskAssigned {
        /// Decision payload.
        data: TaskAssignmentResult,
    },
    /// Progress note answering a request.
    AgentUpdate {
        /// Note payload.
        data: AgentUpdate,
    },
    /// Unsolicited progress note.
    AgentActivity {
        /// Note payload.
        data: AgentUpdate,
    },
    /// Ask an agent for a progress note.
    RequestUpdate {
        /// Task of interest.
        task_id: TaskId,
        /// Agent to ask; any agent when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
    },
    /// Liveness check.
    Ping,
    /// Liveness answer.
    Pong,
}

impl WorkerMessage {
    /// Serialises the message to its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if serialisation fails.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a message from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] for unknown types or payloads
    /// that do not match the contract.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Returns the progress note carried by the message, if any.
    #[must_use]
    pub const fn agent_update(&self) -> Option<&AgentUpdate> {
        match self {
            Self::AgentUpdate { data } | Self::AgentActivity { data } => Some(data),
            _ => None,
        }
    }
}
