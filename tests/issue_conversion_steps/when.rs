//! When steps for issue conversion BDD scenarios.

use super::world::{IntakeWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"issue "{external_id}" is converted"#)]
fn convert_issue(world: &mut IntakeWorld, external_id: String) -> Result<(), eyre::Report> {
    let issue_id = world.issue_id(&external_id)?;
    let result = run_async(world.workflow.convert_issues(&[issue_id]));
    world.last_result = Some(result);
    Ok(())
}
