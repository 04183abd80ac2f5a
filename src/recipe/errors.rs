//! Error types for the deployment domain

use thiserror::Error;

/// Errors that can occur while provisioning or deploying
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Recipe validation failed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The operator answered "no" at a confirmation gate
    #[error("Stopped execution per operator request")]
    Aborted,

    /// A command string could not be split into program + arguments
    #[error("Cannot parse command '{command}': {reason}")]
    BadCommand {
        /// The command string that failed to parse.
        command: String,
        /// Tokenizer error message.
        reason: String,
    },

    /// No remote host could be resolved for a remote step
    #[error("No target host: pass --host, set one in the config, or provide inventory credentials")]
    NoHost,

    /// Configuration is missing or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cloud inventory request failed
    #[error("Inventory request failed: {0}")]
    Inventory(String),

    /// Interactive prompt failed (no terminal, closed stdin)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DeployError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Validation errors for recipes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Recipe name cannot be empty
    #[error("Recipe name cannot be empty")]
    EmptyName,

    /// Recipe must have at least one step
    #[error("Recipe '{recipe}' must have at least one step")]
    EmptyRecipe {
        /// Name of the empty recipe.
        recipe: String,
    },

    /// A step has an empty command
    #[error("Step {index} of '{recipe}' has an empty command")]
    EmptyCommand {
        /// Name of the recipe.
        recipe: String,
        /// One-based step index.
        index: usize,
    },

    /// A step command cannot be tokenized
    #[error("Step {index} of '{recipe}' is not parseable: {reason}")]
    UnparseableCommand {
        /// Name of the recipe.
        recipe: String,
        /// One-based step index.
        index: usize,
        /// Tokenizer error message.
        reason: String,
    },
}
