//! Then steps for automatic assignment BDD scenarios.

use super::world::{AssignmentWorld, run_async};
use rstest_bdd_macros::then;
use treasury_board::agent::{
    domain::AssignmentStatus, ports::AssignmentFilter, services::AssignmentOutcome,
};

#[then(r#"the task is assigned to "{name}""#)]
fn task_assigned_to(world: &AssignmentWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.agent_id(&name)?;
    match &world.last_outcome {
        Some(AssignmentOutcome::Assigned { agent, .. }) if agent.id() == expected => Ok(()),
        other => Err(eyre::eyre!("expected assignment to {name}, found {other:?}")),
    }
}

#[then("no agent is available for the task")]
fn no_agent_available(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    match &world.last_outcome {
        Some(AssignmentOutcome::NoAgentAvailable) => Ok(()),
        other => Err(eyre::eyre!("expected no agent, found {other:?}")),
    }
}

#[then(r#""{name}" has a workload of {workload:u32}"#)]
fn agent_workload(
    world: &AssignmentWorld,
    name: String,
    workload: u32,
) -> Result<(), eyre::Report> {
    let agent_id = world.agent_id(&name)?;
    let agent = run_async(world.workflow.assignments().find_agent(agent_id))?
        .ok_or_else(|| eyre::eyre!("agent {name} vanished"))?;
    if agent.current_workload() != workload {
        return Err(eyre::eyre!(
            "expected {name} to carry {workload}, found {}",
            agent.current_workload()
        ));
    }
    Ok(())
}

#[then("the task's assignment is completed")]
fn assignment_completed(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    let task_id = world.last_task()?.id();
    let history = run_async(
        world
            .workflow
            .assignments()
            .assignments(AssignmentFilter::all().for_task(task_id)),
    )?;
    let statuses: Vec<AssignmentStatus> = history.iter().map(|row| row.status()).collect();
    if statuses != [AssignmentStatus::Completed] {
        return Err(eyre::eyre!("unexpected assignment history {statuses:?}"));
    }
    Ok(())
}
