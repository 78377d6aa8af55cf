//! Then steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async, titles};
use rstest_bdd_macros::then;
use treasury_board::board::domain::{Position, position};

#[then(r#"the "{column}" column lists "{list}""#)]
fn column_lists(world: &BoardWorld, column: String, list: String) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    let lane: Vec<_> = world
        .tasks()?
        .into_iter()
        .filter(|task| task.column_id() == column_id)
        .collect();
    let actual: Vec<&str> = lane.iter().map(|task| task.title()).collect();
    let expected = titles(&list);
    if actual != expected {
        return Err(eyre::eyre!(
            "expected {column} to list {expected:?}, found {actual:?}"
        ));
    }
    for (index, task) in lane.iter().enumerate() {
        if task.position() != Position::from_index(index)? {
            return Err(eyre::eyre!(
                "task {} sits at {} instead of {index}",
                task.title(),
                task.position()
            ));
        }
    }
    Ok(())
}

#[then("every column is densely ordered")]
fn every_column_dense(world: &BoardWorld) -> Result<(), eyre::Report> {
    let tasks = world.tasks()?;
    let columns = run_async(world.workflow.board().list_columns())?;
    for column in &columns {
        if !position::is_dense(&tasks, column.id()) {
            return Err(eyre::eyre!("column {} has gaps", column.title()));
        }
    }
    Ok(())
}
