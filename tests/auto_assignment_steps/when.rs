//! When steps for automatic assignment BDD scenarios.

use super::world::{AssignmentWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use treasury_board::board::{
    domain::{Position, TaskDraft},
    services::MoveTaskRequest,
};

#[when(r#"a task "{title}" is created with auto-assignment"#)]
fn create_with_auto_assignment(
    world: &mut AssignmentWorld,
    title: String,
) -> Result<(), eyre::Report> {
    world.ensure_columns()?;
    let backlog = world.column("Backlog")?.id();
    let created = run_async(
        world
            .workflow
            .create_task(backlog, TaskDraft::new(title)?, true),
    )
    .wrap_err("create task with auto-assignment")?;
    world.last_task = Some(created.task);
    world.last_outcome = created.assignment;
    Ok(())
}

#[when(r#"the task is moved to "{column}""#)]
fn move_task(world: &mut AssignmentWorld, column: String) -> Result<(), eyre::Report> {
    let task_id = world.last_task()?.id();
    let column_id = world.column(&column)?.id();
    run_async(world.workflow.move_task(MoveTaskRequest::new(
        task_id,
        column_id,
        Position::FIRST,
    )))
    .wrap_err_with(|| format!("move task to {column}"))?;
    Ok(())
}
