//! Step definitions for issue conversion scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
