//! Candidate ranking for automatic assignment.
//!
//! Only available agents with spare capacity are candidates. They are ranked
//! by current workload ascending with ties broken by identifier, so the
//! choice is deterministic for a given roster.

use super::Agent;

/// Returns the candidates for automatic assignment in preference order.
#[must_use]
pub fn rank_candidates(agents: &[Agent]) -> Vec<&Agent> {
    let mut candidates: Vec<&Agent> = agents.iter().filter(|agent| agent.is_candidate()).collect();
    candidates.sort_by(|left, right| {
        left.current_workload()
            .cmp(&right.current_workload())
            .then_with(|| left.id().cmp(&right.id()))
    });
    candidates
}
