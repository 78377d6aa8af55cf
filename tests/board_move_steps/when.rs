//! When steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use treasury_board::board::{domain::Position, services::MoveTaskRequest};

#[when(r#"task "{title}" is moved to "{column}" at position {position:u32}"#)]
fn move_task(
    world: &mut BoardWorld,
    title: String,
    column: String,
    position: u32,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let column_id = world.column_id(&column)?;
    run_async(world.workflow.move_task(MoveTaskRequest::new(
        task_id,
        column_id,
        Position::new(position),
    )))
    .wrap_err_with(|| format!("move task {title}"))?;
    Ok(())
}

#[when(r#"task "{title}" is deleted"#)]
fn delete_task(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(world.workflow.delete_task(task_id))
        .wrap_err_with(|| format!("delete task {title}"))?;
    Ok(())
}
