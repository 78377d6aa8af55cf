//! Issue repository over the in-memory state.

use super::{InMemoryStore, board::insert_task};
use crate::board::domain::Task;
use crate::intake::{
    domain::{Issue, IssueId},
    ports::{IssueRepository, IssueRepositoryError, IssueRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl IssueRepository for InMemoryStore {
    async fn store_issue(&self, issue: &Issue) -> IssueRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(IssueRepositoryError::persistence)?;
        if state.issues.contains_key(&issue.id()) {
            return Err(IssueRepositoryError::DuplicateIssue(issue.id()));
        }
        if state
            .issues
            .values()
            .any(|existing| existing.external_id() == issue.external_id())
        {
            return Err(IssueRepositoryError::DuplicateExternalId(
                issue.external_id().to_owned(),
            ));
        }
        state.issues.insert(issue.id(), issue.clone());
        Ok(())
    }

    async fn find_issue(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>> {
        let state = self
            .read_state()
            .map_err(IssueRepositoryError::persistence)?;
        Ok(state.issues.get(&id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> IssueRepositoryResult<Option<Issue>> {
        let state = self
            .read_state()
            .map_err(IssueRepositoryError::persistence)?;
        Ok(state
            .issues
            .values()
            .find(|issue| issue.external_id() == external_id)
            .cloned())
    }

    async fn list_issues(&self) -> IssueRepositoryResult<Vec<Issue>> {
        let state = self
            .read_state()
            .map_err(IssueRepositoryError::persistence)?;
        let mut issues: Vec<Issue> = state.issues.values().cloned().collect();
        issues.sort_by(|left, right| {
            right
                .effective_reported_date()
                .cmp(&left.effective_reported_date())
                .then_with(|| right.created_at().cmp(&left.created_at()))
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(issues)
    }

    async fn set_selection(
        &self,
        id: IssueId,
        selected: bool,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue> {
        let mut state = self
            .write_state()
            .map_err(IssueRepositoryError::persistence)?;
        let issue = state
            .issues
            .get_mut(&id)
            .ok_or(IssueRepositoryError::NotFound(id))?;
        issue.set_selected(selected, at);
        Ok(issue.clone())
    }

    async fn convert_issue(
        &self,
        id: IssueId,
        task: &Task,
        at: DateTime<Utc>,
    ) -> IssueRepositoryResult<Issue> {
        let mut state = self
            .write_state()
            .map_err(IssueRepositoryError::persistence)?;
        let issue = state
            .issues
            .get(&id)
            .ok_or(IssueRepositoryError::NotFound(id))?;
        if let Some(task_id) = issue.kanban_task_id() {
            return Err(IssueRepositoryError::AlreadyConverted {
                issue_id: id,
                task_id,
            });
        }

        insert_task(&mut state, task)?;
        let linked = state
            .issues
            .get_mut(&id)
            .ok_or(IssueRepositoryError::NotFound(id))?;
        linked.link_task(task.id(), at);
        Ok(linked.clone())
    }
}
