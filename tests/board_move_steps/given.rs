//! Given steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async, titles};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use treasury_board::board::domain::TaskDraft;

#[given("the standard board columns")]
fn standard_columns(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    for title in ["Backlog", "In Progress", "Done"] {
        run_async(world.workflow.board().create_column(title, ""))
            .wrap_err_with(|| format!("create column {title}"))?;
    }
    Ok(())
}

#[given(r#"the "{column}" column holds tasks "{list}""#)]
fn column_holds_tasks(
    world: &mut BoardWorld,
    column: String,
    list: String,
) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    for title in titles(&list) {
        run_async(
            world
                .workflow
                .create_task(column_id, TaskDraft::new(title)?, false),
        )
        .wrap_err_with(|| format!("create task {title}"))?;
    }
    Ok(())
}
