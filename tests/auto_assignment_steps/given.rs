//! Given steps for automatic assignment BDD scenarios.

use super::world::{AssignmentWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use treasury_board::{
    agent::{
        domain::{AgentProfile, AgentStatus},
        services::ManualAssignRequest,
    },
    board::domain::TaskDraft,
};

#[given(
    r#"an agent "{name}" with capacity {capacity:u32} already holding {held:u32} tasks"#
)]
fn agent_with_load(
    world: &mut AssignmentWorld,
    name: String,
    capacity: u32,
    held: u32,
) -> Result<(), eyre::Report> {
    world.ensure_columns()?;
    let profile = AgentProfile::new(
        name.as_str(),
        format!("{}@example.com", name.to_ascii_lowercase()),
        "developer",
    )?
    .with_max_workload(capacity);
    let agent = run_async(world.workflow.assignments().register_agent(profile))
        .wrap_err_with(|| format!("register agent {name}"))?;
    let backlog = world.column("Backlog")?.id();
    for index in 0..held {
        let filler = run_async(world.workflow.create_task(
            backlog,
            TaskDraft::new(format!("{name} filler {index}"))?,
            false,
        ))?;
        run_async(
            world
                .workflow
                .assignments()
                .assign(ManualAssignRequest::new(agent.id(), filler.task.id())),
        )
        .wrap_err("preload agent workload")?;
    }
    world.agents.insert(name, agent.id());
    Ok(())
}

#[given(r#""{name}" is offline"#)]
fn agent_is_offline(world: &mut AssignmentWorld, name: String) -> Result<(), eyre::Report> {
    let agent_id = world.agent_id(&name)?;
    run_async(
        world
            .workflow
            .assignments()
            .set_status(agent_id, AgentStatus::Offline),
    )?;
    Ok(())
}
