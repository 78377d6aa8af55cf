//! Time tracking per task and agent.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
