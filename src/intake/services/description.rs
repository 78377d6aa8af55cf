//! Rendering of task descriptions for converted issues.

use crate::intake::domain::Issue;
use minijinja::Environment;
use serde_json::{Map, Value};

/// Placeholder rendered for absent issue fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Renders the task description for `issue` with a `minijinja` template.
///
/// The template sees `title`, `external_id`, `description`, `severity`,
/// `category`, `reporter`, `affected_system`, `reproduction_steps`,
/// `expected_behavior` and `actual_behavior`. Absent fields render as
/// [`NOT_SPECIFIED`].
///
/// # Errors
///
/// Returns the `minijinja` error message when the template is invalid.
pub fn render_description(template: &str, issue: &Issue) -> Result<String, String> {
    let environment = Environment::new();
    environment
        .render_str(template, build_context(issue))
        .map_err(|error| error.to_string())
}

fn build_context(issue: &Issue) -> Map<String, Value> {
    let details = issue.details();
    let fields = [
        ("description", details.description.as_deref()),
        ("category", details.category.as_deref()),
        ("reporter", details.reporter.as_deref()),
        ("affected_system", details.affected_system.as_deref()),
        ("reproduction_steps", details.reproduction_steps.as_deref()),
        ("expected_behavior", details.expected_behavior.as_deref()),
        ("actual_behavior", details.actual_behavior.as_deref()),
    ];

    let mut context = Map::new();
    context.insert("title".to_owned(), Value::String(issue.title().to_owned()));
    context.insert(
        "external_id".to_owned(),
        Value::String(issue.external_id().to_owned()),
    );
    context.insert(
        "severity".to_owned(),
        Value::String(issue.severity().as_str().to_owned()),
    );
    for (key, value) in fields {
        context.insert(
            key.to_owned(),
            Value::String(value.unwrap_or(NOT_SPECIFIED).to_owned()),
        );
    }
    context
}
