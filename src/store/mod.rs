//! Storage adapters implementing every repository port.
//!
//! [`InMemoryStore`] backs tests and embedded use; [`PostgresStore`] is the
//! durable adapter. Both uphold the same contracts: dense positions, atomic
//! workload accounting and single conversion per issue.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{BoardPgPool, PostgresStore};
