//! Error types for FlowForge input handling.

use thiserror::Error;

/// Fatal input error detected before any model is solved.
///
/// Every variant aborts the scenario it was raised for; other scenarios of
/// the same run are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A rule row references a member that is not part of a derived set.
    #[error("{table}: unknown {set} '{value}'")]
    UnknownMember {
        table: String,
        set: &'static str,
        value: String,
    },

    /// The capacity-type hierarchy is not a forest.
    #[error("capacity type '{0}' is its own ancestor")]
    HierarchyCycle(String),

    /// Two objectives of one scenario share a priority.
    #[error("scenario '{scenario}': priority {priority} is declared more than once")]
    DuplicatePriority { scenario: String, priority: i64 },

    /// Two explicit rows collide on the same key with different values.
    #[error("{table}: conflicting rows for key [{key}]")]
    ConflictingRows { table: String, key: String },

    /// A required column is absent or empty.
    #[error("{table}: missing value in column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A cell holds a value of the wrong shape or outside its domain.
    #[error("{table}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        table: String,
        column: String,
        value: String,
    },

    /// An objective name outside the objective library.
    #[error("unknown objective '{0}'")]
    UnknownObjective(String),

    /// The input declares no scenario to solve.
    #[error("no scenarios declared")]
    NoScenarios,

    /// Malformed serialized input.
    #[error("input parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Result type alias for input handling.
pub type Result<T> = std::result::Result<T, ConfigError>;
