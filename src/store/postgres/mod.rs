//! `PostgreSQL` entity store.
//!
//! [`PostgresStore`] implements every repository port over one Diesel
//! connection pool. Blocking Diesel calls run on the Tokio blocking pool, and
//! each multi-row mutation runs inside a single transaction so readers never
//! observe a half-applied position batch or workload change.
//!
//! The schema lives in `migrations/` and is exported as [`BOARD_SCHEMA_SQL`]
//! for callers that provision databases themselves.

mod agent;
mod board;
mod intake;
mod models;
mod schema;
mod timesheet;

use crate::agent::ports::AgentRepositoryError;
use crate::board::ports::BoardRepositoryError;
use crate::intake::ports::IssueRepositoryError;
use crate::timesheet::ports::TimeEntryRepositoryError;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use std::error::Error as StdError;

/// `PostgreSQL` connection pool type used by the store.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// SQL creating the board schema.
pub const BOARD_SCHEMA_SQL: &str =
    include_str!("../../../migrations/2026-01-01-000000_create_board/up.sql");

/// `PostgreSQL`-backed store implementing every repository port.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: BoardPgPool,
}

impl PostgresStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: StoreFailure + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::store_failure)?;
            f(&mut connection)
        })
        .await
        .map_err(E::store_failure)?
    }
}

/// Repository errors able to carry an infrastructure failure.
trait StoreFailure: Sized {
    fn store_failure(err: impl StdError + Send + Sync + 'static) -> Self;
}

impl StoreFailure for BoardRepositoryError {
    fn store_failure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for AgentRepositoryError {
    fn store_failure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for IssueRepositoryError {
    fn store_failure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for TimeEntryRepositoryError {
    fn store_failure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for BoardRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for AgentRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for IssueRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for TimeEntryRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}
