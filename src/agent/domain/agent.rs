//! Agent roster entries and their capacity bookkeeping.

use super::{AgentDomainError, AgentId, ParseAgentStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of an agent for new work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Accepting assignments.
    #[default]
    Available,
    /// Working, not accepting automatic assignments.
    Busy,
    /// Not reachable.
    Offline,
}

impl AgentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentStatus {
    type Error = ParseAgentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "offline" => Ok(Self::Offline),
            _ => Err(ParseAgentStatusError(value.to_owned())),
        }
    }
}

/// Validated registration data for a new agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    name: String,
    email: String,
    role: String,
    max_workload: u32,
    skills: Vec<String>,
}

impl AgentProfile {
    /// Default number of concurrent assignments an agent can hold.
    pub const DEFAULT_MAX_WORKLOAD: u32 = 5;

    /// Creates a profile with the default capacity and no skills.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError`] when the name or role is blank or the
    /// email is malformed.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Result<Self, AgentDomainError> {
        let raw_name = name.into();
        let trimmed_name = raw_name.trim();
        if trimmed_name.is_empty() {
            return Err(AgentDomainError::EmptyName);
        }

        let raw_email = email.into();
        let normalized_email = raw_email.trim().to_ascii_lowercase();
        if !is_plausible_email(&normalized_email) {
            return Err(AgentDomainError::InvalidEmail(raw_email));
        }

        let raw_role = role.into();
        let trimmed_role = raw_role.trim();
        if trimmed_role.is_empty() {
            return Err(AgentDomainError::EmptyRole);
        }

        Ok(Self {
            name: trimmed_name.to_owned(),
            email: normalized_email,
            role: trimmed_role.to_owned(),
            max_workload: Self::DEFAULT_MAX_WORKLOAD,
            skills: Vec::new(),
        })
    }

    /// Sets the maximum number of concurrent assignments.
    #[must_use]
    pub const fn with_max_workload(mut self, max_workload: u32) -> Self {
        self.max_workload = max_workload;
        self
    }

    /// Sets the skill tags; blank tags are dropped.
    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.skills = skills
            .into_iter()
            .map(|skill| skill.trim().to_owned())
            .filter(|skill| !skill.is_empty())
            .collect();
        self
    }
}

fn is_plausible_email(candidate: &str) -> bool {
    candidate.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.contains('@')
    })
}

/// A worker with bounded task capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    name: String,
    email: String,
    role: String,
    status: AgentStatus,
    current_workload: u32,
    max_workload: u32,
    skills: Vec<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAgentData {
    /// Persisted identifier.
    pub id: AgentId,
    /// Persisted display name.
    pub name: String,
    /// Persisted unique email.
    pub email: String,
    /// Persisted role.
    pub role: String,
    /// Persisted availability.
    pub status: AgentStatus,
    /// Persisted count of active assignments.
    pub current_workload: u32,
    /// Persisted capacity.
    pub max_workload: u32,
    /// Persisted skill tags.
    pub skills: Vec<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Registers a new, available agent with no workload.
    #[must_use]
    pub fn new(profile: AgentProfile, clock: &impl Clock) -> Self {
        Self {
            id: AgentId::new(),
            name: profile.name,
            email: profile.email,
            role: profile.role,
            status: AgentStatus::Available,
            current_workload: 0,
            max_workload: profile.max_workload,
            skills: profile.skills,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an agent from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAgentData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            role: data.role,
            status: data.status,
            current_workload: data.current_workload,
            max_workload: data.max_workload,
            skills: data.skills,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the availability.
    #[must_use]
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Returns the number of active assignments held.
    #[must_use]
    pub const fn current_workload(&self) -> u32 {
        self.current_workload
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn max_workload(&self) -> u32 {
        self.max_workload
    }

    /// Returns the skill tags.
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the agent has the given role, ignoring case.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role.trim())
    }

    /// Returns whether another assignment fits within capacity.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.current_workload < self.max_workload
    }

    /// Returns whether automatic assignment may pick this agent.
    #[must_use]
    pub const fn is_candidate(&self) -> bool {
        matches!(self.status, AgentStatus::Available) && self.has_capacity()
    }

    /// Returns the workload as a percentage of capacity, clamped to
    /// `0..=100`; zero when the agent has no capacity.
    #[must_use]
    pub fn workload_percent(&self) -> u32 {
        self.current_workload
            .saturating_mul(100)
            .checked_div(self.max_workload)
            .unwrap_or(0)
            .min(100)
    }

    /// Changes the availability.
    pub const fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
    }

    /// Takes one unit of capacity; returns `false` when already full.
    pub const fn take_capacity(&mut self) -> bool {
        if !self.has_capacity() {
            return false;
        }
        self.current_workload = self.current_workload.saturating_add(1);
        true
    }

    /// Returns one unit of capacity, never dropping below zero.
    pub const fn release_capacity(&mut self) {
        self.current_workload = self.current_workload.saturating_sub(1);
    }
}
