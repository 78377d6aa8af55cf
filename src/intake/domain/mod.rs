//! Domain model for externally reported issues.

mod error;
mod ids;
mod issue;

pub use error::{IntakeDomainError, ParseIssueStatusError, ParseSeverityError};
pub use ids::IssueId;
pub use issue::{
    Issue, IssueDetails, IssueReport, IssueStatus, PersistedIssueData, Severity,
};
