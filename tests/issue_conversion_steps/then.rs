//! Then steps for issue conversion BDD scenarios.

use super::world::{IntakeWorld, run_async};
use rstest_bdd_macros::then;
use treasury_board::{
    board::domain::Priority, intake::services::IntakeServiceError, workflow::WorkflowError,
};

#[then(r#"a task titled "{title}" sits in "{column}" with priority "{priority}""#)]
fn task_in_column(
    world: &IntakeWorld,
    title: String,
    column: String,
    priority: String,
) -> Result<(), eyre::Report> {
    let expected_priority = Priority::try_from(priority.as_str())
        .map_err(|err| eyre::eyre!("invalid priority in scenario: {err}"))?;
    let converted = world
        .last_report()?
        .converted
        .first()
        .ok_or_else(|| eyre::eyre!("nothing was converted"))?;
    let columns = run_async(world.workflow.board().list_columns())?;
    let landing = columns
        .iter()
        .find(|candidate| candidate.id() == converted.task.column_id())
        .ok_or_else(|| eyre::eyre!("task sits in an unknown column"))?;
    if converted.task.title() != title || landing.title() != column {
        return Err(eyre::eyre!(
            "expected '{title}' in {column}, found '{}' in {}",
            converted.task.title(),
            landing.title()
        ));
    }
    if converted.task.priority() != expected_priority {
        return Err(eyre::eyre!(
            "expected priority {expected_priority}, found {}",
            converted.task.priority()
        ));
    }
    Ok(())
}

#[then(r#"issue "{external_id}" is linked to that task"#)]
fn issue_linked(world: &IntakeWorld, external_id: String) -> Result<(), eyre::Report> {
    let issue_id = world.issue_id(&external_id)?;
    let converted = world
        .last_report()?
        .converted
        .first()
        .ok_or_else(|| eyre::eyre!("nothing was converted"))?;
    let issues = run_async(world.workflow.intake().list_issues())?;
    let issue = issues
        .iter()
        .find(|candidate| candidate.id() == issue_id)
        .ok_or_else(|| eyre::eyre!("issue {external_id} vanished"))?;
    if issue.kanban_task_id() != Some(converted.task.id()) {
        return Err(eyre::eyre!("issue {external_id} is not linked to the task"));
    }
    Ok(())
}

#[then("the board holds {count:usize} tasks")]
fn board_holds(world: &IntakeWorld, count: usize) -> Result<(), eyre::Report> {
    let tasks = run_async(world.workflow.board().list_tasks())?;
    if tasks.len() != count {
        return Err(eyre::eyre!("expected {count} tasks, found {}", tasks.len()));
    }
    Ok(())
}

#[then(r#"the last conversion skipped "{external_id}""#)]
fn last_conversion_skipped(world: &IntakeWorld, external_id: String) -> Result<(), eyre::Report> {
    let issue_id = world.issue_id(&external_id)?;
    let report = world.last_report()?;
    if report.skipped != [issue_id] || !report.converted.is_empty() {
        return Err(eyre::eyre!("expected only {external_id} to be skipped"));
    }
    Ok(())
}

#[then("the conversion fails because the board has no intake column")]
fn conversion_fails_without_column(world: &IntakeWorld) -> Result<(), eyre::Report> {
    match &world.last_result {
        Some(Err(WorkflowError::Intake(IntakeServiceError::NoIntakeColumn))) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("unexpected conversion error: {err}")),
        Some(Ok(_)) => Err(eyre::eyre!("conversion succeeded without columns")),
        None => Err(eyre::eyre!("no conversion ran in this scenario")),
    }
}
