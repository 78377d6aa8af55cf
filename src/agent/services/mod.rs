//! Application services for agent assignment.

mod assignment;

pub use assignment::{
    AssignmentError, AssignmentOutcome, AssignmentResult, AssignmentService,
    DEFAULT_SYSTEM_ASSIGNER, ManualAssignRequest,
};
