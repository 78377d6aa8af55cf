//! Externally reported issues awaiting conversion into board tasks.

use super::{IntakeDomainError, IssueId, ParseIssueStatusError, ParseSeverityError};
use crate::board::domain::{Priority, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported impact of an issue.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic or minor.
    Low,
    /// Degrades a workflow.
    #[default]
    Medium,
    /// Blocks a workflow.
    High,
}

impl Severity {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseSeverityError(value.to_owned())),
        }
    }
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self::Low,
            Severity::Medium => Self::Medium,
            Severity::High => Self::High,
        }
    }
}

/// Triage state of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Newly reported.
    #[default]
    Open,
    /// Converted into a task and being worked.
    InProgress,
    /// Fixed.
    Resolved,
    /// Closed without further work.
    Closed,
}

impl IssueStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IssueStatus {
    type Error = ParseIssueStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseIssueStatusError(value.to_owned())),
        }
    }
}

/// Free-text details captured by the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    /// Longer description.
    pub description: Option<String>,
    /// Reporter-chosen category.
    pub category: Option<String>,
    /// Who reported the issue.
    pub reporter: Option<String>,
    /// System the issue was observed in.
    pub affected_system: Option<String>,
    /// How to reproduce.
    pub reproduction_steps: Option<String>,
    /// What should have happened.
    pub expected_behavior: Option<String>,
    /// What happened instead.
    pub actual_behavior: Option<String>,
}

/// Validated report for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    external_id: String,
    title: String,
    severity: Severity,
    reported_date: Option<NaiveDate>,
    details: IssueDetails,
}

impl IssueReport {
    /// Creates a report with medium severity.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeDomainError`] when the external identifier or title is
    /// blank.
    pub fn new(
        external_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, IntakeDomainError> {
        let raw_external_id = external_id.into();
        let trimmed_external_id = raw_external_id.trim();
        if trimmed_external_id.is_empty() {
            return Err(IntakeDomainError::EmptyExternalId);
        }
        let raw_title = title.into();
        let trimmed_title = raw_title.trim();
        if trimmed_title.is_empty() {
            return Err(IntakeDomainError::EmptyTitle);
        }
        Ok(Self {
            external_id: trimmed_external_id.to_owned(),
            title: trimmed_title.to_owned(),
            severity: Severity::default(),
            reported_date: None,
            details: IssueDetails::default(),
        })
    }

    /// Returns the tracker identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Sets the severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the date the reporter observed the issue.
    #[must_use]
    pub const fn with_reported_date(mut self, reported_date: NaiveDate) -> Self {
        self.reported_date = Some(reported_date);
        self
    }

    /// Sets the free-text details; blank values are dropped.
    #[must_use]
    pub fn with_details(mut self, details: IssueDetails) -> Self {
        self.details = IssueDetails {
            description: details.description.and_then(non_blank),
            category: details.category.and_then(non_blank),
            reporter: details.reporter.and_then(non_blank),
            affected_system: details.affected_system.and_then(non_blank),
            reproduction_steps: details.reproduction_steps.and_then(non_blank),
            expected_behavior: details.expected_behavior.and_then(non_blank),
            actual_behavior: details.actual_behavior.and_then(non_blank),
        };
        self
    }
}

fn non_blank(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// An externally reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: IssueId,
    external_id: String,
    title: String,
    severity: Severity,
    status: IssueStatus,
    reported_date: Option<NaiveDate>,
    details: IssueDetails,
    selected_for_kanban: bool,
    kanban_task_id: Option<TaskId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIssueData {
    /// Persisted identifier.
    pub id: IssueId,
    /// Persisted external tracker identifier.
    pub external_id: String,
    /// Persisted title.
    pub title: String,
    /// Persisted severity.
    pub severity: Severity,
    /// Persisted triage state.
    pub status: IssueStatus,
    /// Persisted report date.
    pub reported_date: Option<NaiveDate>,
    /// Persisted free-text details.
    pub details: IssueDetails,
    /// Persisted selection flag.
    pub selected_for_kanban: bool,
    /// Persisted link to the converted task.
    pub kanban_task_id: Option<TaskId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Records a new open issue.
    #[must_use]
    pub fn new(report: IssueReport, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: IssueId::new(),
            external_id: report.external_id,
            title: report.title,
            severity: report.severity,
            status: IssueStatus::Open,
            reported_date: report.reported_date,
            details: report.details,
            selected_for_kanban: false,
            kanban_task_id: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an issue from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIssueData) -> Self {
        Self {
            id: data.id,
            external_id: data.external_id,
            title: data.title,
            severity: data.severity,
            status: data.status,
            reported_date: data.reported_date,
            details: data.details,
            selected_for_kanban: data.selected_for_kanban,
            kanban_task_id: data.kanban_task_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> IssueId {
        self.id
    }

    /// Returns the external tracker identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the triage state.
    #[must_use]
    pub const fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns the report date.
    #[must_use]
    pub const fn reported_date(&self) -> Option<NaiveDate> {
        self.reported_date
    }

    /// Returns the free-text details.
    #[must_use]
    pub const fn details(&self) -> &IssueDetails {
        &self.details
    }

    /// Returns whether the issue is flagged for the board.
    #[must_use]
    pub const fn is_selected_for_kanban(&self) -> bool {
        self.selected_for_kanban
    }

    /// Returns the converted task, if any.
    #[must_use]
    pub const fn kanban_task_id(&self) -> Option<TaskId> {
        self.kanban_task_id
    }

    /// Returns whether the issue has been converted into a task.
    #[must_use]
    pub const fn is_converted(&self) -> bool {
        self.kanban_task_id.is_some()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Date used to order issues, falling back to the creation date.
    #[must_use]
    pub fn effective_reported_date(&self) -> NaiveDate {
        self.reported_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    /// Flags or unflags the issue for the board.
    pub fn set_selected(&mut self, selected: bool, at: DateTime<Utc>) {
        self.selected_for_kanban = selected;
        self.updated_at = at;
    }

    /// Links the issue to the task created from it.
    ///
    /// Returns `false`, leaving the issue untouched, when it is already
    /// linked.
    pub fn link_task(&mut self, task_id: TaskId, at: DateTime<Utc>) -> bool {
        if self.is_converted() {
            return false;
        }
        self.kanban_task_id = Some(task_id);
        self.status = IssueStatus::InProgress;
        self.updated_at = at;
        true
    }
}
