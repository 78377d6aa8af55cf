//! Issue ingestion and the issue-to-task converter.

use super::description::render_description;
use crate::agent::{
    domain::AgentAssignment,
    ports::AgentRepository,
    services::{AssignmentOutcome, AssignmentService},
};
use crate::board::{
    domain::{BoardDomainError, Task, TaskDraft, position},
    ports::{BoardRepository, BoardRepositoryError},
};
use crate::config::BoardConfig;
use crate::intake::{
    domain::{IntakeDomainError, Issue, IssueId, IssueReport},
    ports::{IssueRepository, IssueRepositoryError},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How auto-assignment went for a converted issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAssignment {
    /// Auto-assignment ran to completion.
    Ran(AssignmentOutcome),
    /// Auto-assignment failed; the task exists but stays unassigned.
    Failed {
        /// Rendered assignment error.
        reason: String,
    },
}

impl AutoAssignment {
    /// Returns the assignment when an agent took the task.
    #[must_use]
    pub const fn assignment(&self) -> Option<&AgentAssignment> {
        match self {
            Self::Ran(outcome) => outcome.assignment(),
            Self::Failed { .. } => None,
        }
    }
}

/// One issue turned into a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedIssue {
    /// The issue after linking.
    pub issue: Issue,
    /// The created task.
    pub task: Task,
    /// Result of auto-assigning the task.
    pub assignment: AutoAssignment,
}

/// Outcome of converting a batch of issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Issues converted by this call, in request order.
    pub converted: Vec<ConvertedIssue>,
    /// Issues skipped because they were already converted.
    pub skipped: Vec<IssueId>,
}

/// Service-level errors for issue intake.
#[derive(Debug, Error)]
pub enum IntakeServiceError {
    /// Issue validation failed.
    #[error(transparent)]
    Domain(#[from] IntakeDomainError),
    /// Task validation failed.
    #[error(transparent)]
    BoardDomain(#[from] BoardDomainError),
    /// Issue repository operation failed.
    #[error(transparent)]
    Repository(#[from] IssueRepositoryError),
    /// Board repository operation failed.
    #[error(transparent)]
    Board(#[from] BoardRepositoryError),
    /// A requested issue does not exist.
    #[error("issue not found: {0}")]
    IssueNotFound(IssueId),
    /// The tracker identifier was already ingested as another issue.
    #[error("external id {external_id} already ingested as issue {issue_id}")]
    AlreadyIngested {
        /// Tracker identifier of the rejected report.
        external_id: String,
        /// Issue holding the identifier.
        issue_id: IssueId,
    },
    /// The board has no column to receive converted issues.
    #[error("board has no columns to receive converted issues")]
    NoIntakeColumn,
    /// The description template failed to render.
    #[error("failed to render task description for issue {issue_id}: {reason}")]
    Template {
        /// Issue being converted.
        issue_id: IssueId,
        /// Renderer message.
        reason: String,
    },
}

/// Result type for intake service operations.
pub type IntakeServiceResult<T> = Result<T, IntakeServiceError>;

/// Issue intake and conversion service.
#[derive(Clone)]
pub struct IssueIntakeService<I, B, A, C>
where
    I: IssueRepository,
    B: BoardRepository,
    A: AgentRepository,
    C: Clock + Send + Sync,
{
    issues: Arc<I>,
    board: Arc<B>,
    assignments: AssignmentService<A, C>,
    clock: Arc<C>,
    config: Arc<BoardConfig>,
}

impl<I, B, A, C> IssueIntakeService<I, B, A, C>
where
    I: IssueRepository,
    B: BoardRepository,
    A: AgentRepository,
    C: Clock + Send + Sync,
{
    /// Creates an intake service with the default configuration.
    #[must_use]
    pub fn new(
        issues: Arc<I>,
        board: Arc<B>,
        assignments: AssignmentService<A, C>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            issues,
            board,
            assignments,
            clock,
            config: Arc::new(BoardConfig::default()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: Arc<BoardConfig>) -> Self {
        self.config = config;
        self
    }

    /// Records a newly reported issue.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::AlreadyIngested`] when the external
    /// identifier belongs to a stored issue, or
    /// [`IntakeServiceError::Repository`] when a concurrent ingest wins the
    /// store's uniqueness check.
    pub async fn ingest(&self, report: IssueReport) -> IntakeServiceResult<Issue> {
        if let Some(existing) = self.issues.find_by_external_id(report.external_id()).await? {
            debug!(
                issue_id = %existing.id(),
                external_id = existing.external_id(),
                "rejected duplicate issue report"
            );
            return Err(IntakeServiceError::AlreadyIngested {
                external_id: existing.external_id().to_owned(),
                issue_id: existing.id(),
            });
        }
        let issue = Issue::new(report, &*self.clock);
        self.issues.store_issue(&issue).await?;
        info!(
            issue_id = %issue.id(),
            external_id = issue.external_id(),
            severity = %issue.severity(),
            "ingested issue"
        );
        Ok(issue)
    }

    /// Returns every issue, most recently reported first.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] when the lookup fails.
    pub async fn list_issues(&self) -> IntakeServiceResult<Vec<Issue>> {
        Ok(self.issues.list_issues().await?)
    }

    /// Returns issues not yet converted into tasks.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] when the lookup fails.
    pub async fn open_issues(&self) -> IntakeServiceResult<Vec<Issue>> {
        let issues = self.issues.list_issues().await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_converted())
            .collect())
    }

    /// Flags or unflags an issue for conversion.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] for an unknown issue.
    pub async fn set_selection(&self, id: IssueId, selected: bool) -> IntakeServiceResult<Issue> {
        let issue = self
            .issues
            .set_selection(id, selected, self.clock.utc())
            .await?;
        debug!(issue_id = %id, selected, "changed issue selection");
        Ok(issue)
    }

    /// Converts every selected, unconverted issue.
    ///
    /// # Errors
    ///
    /// See [`Self::convert`].
    pub async fn convert_selected(&self) -> IntakeServiceResult<ConversionReport> {
        let selected: Vec<IssueId> = self
            .issues
            .list_issues()
            .await?
            .iter()
            .filter(|issue| issue.is_selected_for_kanban() && !issue.is_converted())
            .map(Issue::id)
            .collect();
        self.convert(&selected).await
    }

    /// Converts the requested issues into tasks in the intake column.
    ///
    /// Every identifier is checked before anything is written. Issues that
    /// are already converted, including by a concurrent caller, are reported
    /// as skipped. Each new task is offered to auto-assignment; a failed
    /// assignment is recorded on that issue's entry and the batch goes on,
    /// since the task and its issue link are already committed.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::IssueNotFound`] for an unknown
    /// identifier, [`IntakeServiceError::NoIntakeColumn`] for an empty
    /// board, or the first persistence failure encountered.
    pub async fn convert(&self, ids: &[IssueId]) -> IntakeServiceResult<ConversionReport> {
        let mut seen = HashSet::new();
        let mut requested = Vec::new();
        for id in ids.iter().copied().filter(|id| seen.insert(*id)) {
            let issue = self
                .issues
                .find_issue(id)
                .await?
                .ok_or(IntakeServiceError::IssueNotFound(id))?;
            requested.push(issue);
        }
        if requested.is_empty() {
            return Ok(ConversionReport::default());
        }

        let columns = self.board.list_columns().await?;
        let intake = self
            .config
            .resolve_intake(&columns)
            .ok_or(IntakeServiceError::NoIntakeColumn)?
            .id();

        let mut report = ConversionReport::default();
        for issue in requested {
            if issue.is_converted() {
                debug!(issue_id = %issue.id(), "issue already converted");
                report.skipped.push(issue.id());
                continue;
            }

            let description = render_description(&self.config.description_template, &issue)
                .map_err(|reason| IntakeServiceError::Template {
                    issue_id: issue.id(),
                    reason,
                })?;
            let draft = TaskDraft::new(issue.title())?
                .with_description(description)
                .with_priority(issue.severity().into());
            let members = self.board.list_column_tasks(intake).await?;
            let task = Task::new(
                draft,
                intake,
                position::append_position(members.len())?,
                &*self.clock,
            );

            let linked = match self
                .issues
                .convert_issue(issue.id(), &task, self.clock.utc())
                .await
            {
                Ok(linked) => linked,
                Err(IssueRepositoryError::AlreadyConverted { issue_id, .. }) => {
                    debug!(issue_id = %issue_id, "issue converted concurrently");
                    report.skipped.push(issue_id);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let assignment = match self.assignments.auto_assign(task.id()).await {
                Ok(outcome) => AutoAssignment::Ran(outcome),
                Err(err) => {
                    warn!(
                        issue_id = %linked.id(),
                        task_id = %task.id(),
                        error = %err,
                        "auto-assignment failed for converted issue"
                    );
                    AutoAssignment::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            info!(
                issue_id = %linked.id(),
                task_id = %task.id(),
                assigned = assignment.assignment().is_some(),
                "converted issue"
            );
            report.converted.push(ConvertedIssue {
                issue: linked,
                task,
                assignment,
            });
        }
        Ok(report)
    }
}
