//! Board configuration.
//!
//! Column roles are resolved by title so that a board can be laid out freely:
//! the intake column receives converted issues, the terminal column marks
//! work as done, and the in-progress column feeds the statistics view.
//!
//! ```toml
//! intake_column = "Backlog"
//! in_progress_column = "In Progress"
//! terminal_column = "Done"
//! system_assigner = "coordinator"
//! ```

use crate::board::domain::Column;
use crate::worker::DEFAULT_FEED_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default `minijinja` template for descriptions of tasks converted from
/// issues.
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = "{{ description }}

**Original Issue Details:**
- Severity: {{ severity }}
- Category: {{ category }}
- Reporter: {{ reporter }}
- Affected System: {{ affected_system }}

**Reproduction Steps:**
{{ reproduction_steps }}

**Expected Behavior:**
{{ expected_behavior }}

**Actual Behavior:**
{{ actual_behavior }}";

/// Runtime configuration shared by board services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Title of the column converted issues land in.
    pub intake_column: String,
    /// Title of the column counted as work in progress.
    pub in_progress_column: String,
    /// Title of the column that marks tasks as done.
    pub terminal_column: String,
    /// Name recorded as `assigned_by` for automatic assignments.
    pub system_assigner: String,
    /// Agent role left out of performance analytics.
    pub analytics_excluded_role: String,
    /// Number of worker updates kept by the activity feed.
    pub activity_feed_capacity: usize,
    /// Template used to render converted task descriptions.
    pub description_template: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            intake_column: "Backlog".to_owned(),
            in_progress_column: "In Progress".to_owned(),
            terminal_column: "Done".to_owned(),
            system_assigner: "coordinator".to_owned(),
            analytics_excluded_role: "coordinator".to_owned(),
            activity_feed_capacity: DEFAULT_FEED_CAPACITY,
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_owned(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid TOML for [`BoardConfig`].
    #[error("failed to parse board config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required label is blank.
    #[error("config field `{0}` must not be blank")]
    BlankField(&'static str),
}

impl BoardConfig {
    /// Parses configuration from TOML text; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input and
    /// [`ConfigError::BlankField`] when a label is blank.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        match fs::read_to_string(file) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %file.display(), "board config not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                path: file.to_path_buf(),
                source: err,
            }),
        }
    }

    /// Checks that every label is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BlankField`] naming the first blank label.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let labels = [
            ("intake_column", &self.intake_column),
            ("in_progress_column", &self.in_progress_column),
            ("terminal_column", &self.terminal_column),
            ("system_assigner", &self.system_assigner),
        ];
        match labels.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ConfigError::BlankField(field)),
            None => Ok(()),
        }
    }

    /// Returns the intake column: the one titled [`Self::intake_column`],
    /// otherwise the first column by position.
    #[must_use]
    pub fn resolve_intake<'a>(&self, columns: &'a [Column]) -> Option<&'a Column> {
        columns
            .iter()
            .find(|column| column.has_title(&self.intake_column))
            .or_else(|| columns.iter().min_by_key(|column| column.position()))
    }

    /// Returns the terminal column: the one titled [`Self::terminal_column`],
    /// otherwise the last column by position.
    #[must_use]
    pub fn resolve_terminal<'a>(&self, columns: &'a [Column]) -> Option<&'a Column> {
        columns
            .iter()
            .find(|column| column.has_title(&self.terminal_column))
            .or_else(|| columns.iter().max_by_key(|column| column.position()))
    }

    /// Returns the column titled [`Self::in_progress_column`], if present.
    #[must_use]
    pub fn resolve_in_progress<'a>(&self, columns: &'a [Column]) -> Option<&'a Column> {
        columns
            .iter()
            .find(|column| column.has_title(&self.in_progress_column))
    }
}
