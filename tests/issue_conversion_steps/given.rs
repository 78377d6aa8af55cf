//! Given steps for issue conversion BDD scenarios.

use super::world::{IntakeWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use treasury_board::intake::domain::{IssueDetails, IssueReport, Severity};

#[given("the standard board columns")]
fn standard_columns(world: &mut IntakeWorld) -> Result<(), eyre::Report> {
    for title in ["Backlog", "In Progress", "Done"] {
        run_async(world.workflow.board().create_column(title, ""))
            .wrap_err_with(|| format!("create column {title}"))?;
    }
    Ok(())
}

#[given(r#"a reported issue "{external_id}" titled "{title}" with severity "{severity}""#)]
fn reported_issue(
    world: &mut IntakeWorld,
    external_id: String,
    title: String,
    severity: String,
) -> Result<(), eyre::Report> {
    let parsed = Severity::try_from(severity.as_str())
        .map_err(|err| eyre::eyre!("invalid severity in scenario: {err}"))?;
    let report = IssueReport::new(external_id.as_str(), title)?
        .with_severity(parsed)
        .with_details(IssueDetails {
            description: Some("Reported through the finance desk".to_owned()),
            reporter: Some("controller".to_owned()),
            ..IssueDetails::default()
        });
    let issue = run_async(world.workflow.intake().ingest(report))
        .wrap_err_with(|| format!("ingest issue {external_id}"))?;
    world.issues.insert(external_id, issue.id());
    Ok(())
}
