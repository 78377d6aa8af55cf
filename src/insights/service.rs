//! Read-side service assembling views from committed data.

use super::{
    analytics::{AnalyticsInput, AnalyticsReport, build_analytics},
    board_view::{BoardView, build_board_view},
    progress::{AgentProgress, agent_progress},
    statistics::{BoardStatistics, board_statistics},
};
use crate::agent::{
    domain::AgentId,
    ports::{AgentRepository, AgentRepositoryError, AssignmentFilter},
};
use crate::board::{
    domain::{Column, Task},
    ports::{BoardRepository, BoardRepositoryError},
};
use crate::config::BoardConfig;
use crate::timesheet::{
    domain::AgentTimeStats,
    ports::{TimeEntryRepository, TimeEntryRepositoryError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while assembling views.
#[derive(Debug, Error)]
pub enum InsightsError {
    /// Board lookup failed.
    #[error(transparent)]
    Board(#[from] BoardRepositoryError),
    /// Agent lookup failed.
    #[error(transparent)]
    Agent(#[from] AgentRepositoryError),
    /// Time entry lookup failed.
    #[error(transparent)]
    Timesheet(#[from] TimeEntryRepositoryError),
    /// The agent does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
}

/// Result type for insights operations.
pub type InsightsResult<T> = Result<T, InsightsError>;

/// Read-side aggregation service over one store.
#[derive(Clone)]
pub struct InsightsService<S, C>
where
    S: BoardRepository + AgentRepository + TimeEntryRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: Arc<BoardConfig>,
}

impl<S, C> InsightsService<S, C>
where
    S: BoardRepository + AgentRepository + TimeEntryRepository,
    C: Clock + Send + Sync,
{
    /// Creates an insights service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, config: Arc<BoardConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Returns the board grouped by column.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Board`] when the lookup fails.
    pub async fn board_view(&self) -> InsightsResult<BoardView> {
        let columns = self.store.list_columns().await?;
        let tasks = self.store.list_tasks().await?;
        Ok(build_board_view(columns, tasks))
    }

    /// Returns an agent's progress over its assignments.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::AgentNotFound`] for an unknown agent.
    pub async fn agent_progress(&self, agent_id: AgentId) -> InsightsResult<AgentProgress> {
        let agent = self
            .store
            .find_agent(agent_id)
            .await?
            .ok_or(InsightsError::AgentNotFound(agent_id))?;
        let assignments = self
            .store
            .list_assignments(AssignmentFilter::all().for_agent(agent_id))
            .await?;
        let columns = self.store.list_columns().await?;
        let tasks = self.store.list_tasks().await?;
        let terminal = self.config.resolve_terminal(&columns).map(Column::id);
        Ok(agent_progress(agent, assignments, &tasks, terminal))
    }

    /// Returns headline board counts as of today.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Board`] when the lookup fails.
    pub async fn statistics(&self) -> InsightsResult<BoardStatistics> {
        let columns = self.store.list_columns().await?;
        let tasks = self.store.list_tasks().await?;
        Ok(self.statistics_for(&columns, &tasks))
    }

    /// Returns the full analytics report.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure.
    pub async fn analytics(&self) -> InsightsResult<AnalyticsReport> {
        let columns = self.store.list_columns().await?;
        let tasks = self.store.list_tasks().await?;
        let agents = self.store.list_agents().await?;
        let assignments = self.store.list_assignments(AssignmentFilter::all()).await?;

        let mut time_stats = HashMap::new();
        for agent in &agents {
            let entries = self.store.list_agent_entries(agent.id()).await?;
            time_stats.insert(agent.id(), AgentTimeStats::from_entries(&entries));
        }

        let statistics = self.statistics_for(&columns, &tasks);
        let input = AnalyticsInput {
            tasks: &tasks,
            agents: &agents,
            assignments: &assignments,
            time_stats: &time_stats,
            excluded_role: &self.config.analytics_excluded_role,
            now: self.clock.utc(),
        };
        let report = build_analytics(&input, statistics);
        debug!(
            agents = report.agent_performance.len(),
            velocity = report.team_velocity,
            "built analytics report"
        );
        Ok(report)
    }

    fn statistics_for(&self, columns: &[Column], tasks: &[Task]) -> BoardStatistics {
        let terminal = self.config.resolve_terminal(columns).map(Column::id);
        let in_progress = self.config.resolve_in_progress(columns).map(Column::id);
        board_statistics(tasks, terminal, in_progress, self.clock.utc().date_naive())
    }
}
