//! Application services for issue intake and conversion.

mod conversion;
mod description;

pub use conversion::{
    AutoAssignment, ConversionReport, ConvertedIssue, IntakeServiceError, IntakeServiceResult,
    IssueIntakeService,
};
pub use description::{NOT_SPECIFIED, render_description};
