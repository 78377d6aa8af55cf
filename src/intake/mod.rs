//! Intake of externally reported issues and their conversion into tasks.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Ingestion and the converter in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
