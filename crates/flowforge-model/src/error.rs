//! Error types for model assembly.

use thiserror::Error;

/// Errors raised while assembling a model from scenario data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A variable name was declared twice.
    #[error("variable '{0}' declared more than once")]
    DuplicateVariable(String),

    /// A constraint referenced a variable the model does not own.
    #[error("unknown variable index {0}")]
    UnknownVariable(usize),

    /// Invalid input detected while assembling.
    #[error(transparent)]
    Config(#[from] flowforge_core::ConfigError),
}

/// Result type alias for model assembly.
pub type Result<T> = std::result::Result<T, ModelError>;
