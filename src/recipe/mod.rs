//! Recipe domain: steps, validation, gating and sequencing
//!
//! A recipe is a statically authored, ordered list of guarded commands that
//! together perform one provisioning task (bootstrap a server, push code,
//! run migrations). Execution is strictly sequential with a single binary
//! continue/abort decision after each failed step.

pub mod catalog;
pub mod confirm;
pub mod errors;
pub mod sequencer;
pub mod vars;

pub use confirm::{Confirmer, ScriptedConfirmer, TerminalConfirmer, guard};
pub use errors::{DeployError, ValidationError};
pub use sequencer::{RecipeReport, Sequencer, StepReport};
pub use vars::Vars;

use crate::executor::ExecutionTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One guarded command in a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    /// Execution context for the command
    pub target: ExecutionTarget,

    /// Authored command, possibly containing `{{placeholders}}`
    pub command: String,

    /// Question shown when the command fails; empty suppresses the gate and
    /// the failure is tolerated silently
    #[serde(default)]
    pub on_failure: String,
}

impl RecipeStep {
    /// Creates a gated step on the operator's machine
    #[must_use]
    pub fn local(command: impl Into<String>, on_failure: impl Into<String>) -> Self {
        Self {
            target: ExecutionTarget::Local,
            command: command.into(),
            on_failure: on_failure.into(),
        }
    }

    /// Creates a gated step on the target host
    #[must_use]
    pub fn remote(command: impl Into<String>, on_failure: impl Into<String>) -> Self {
        Self {
            target: ExecutionTarget::Remote,
            command: command.into(),
            on_failure: on_failure.into(),
        }
    }

    /// Creates a gated privileged step on the target host
    #[must_use]
    pub fn sudo(command: impl Into<String>, on_failure: impl Into<String>) -> Self {
        Self {
            target: ExecutionTarget::RemotePrivileged,
            command: command.into(),
            on_failure: on_failure.into(),
        }
    }

    /// Creates a step whose failure is tolerated without asking
    #[must_use]
    pub fn unguarded(target: ExecutionTarget, command: impl Into<String>) -> Self {
        Self {
            target,
            command: command.into(),
            on_failure: String::new(),
        }
    }

    /// Returns true if a failure of this step routes through the gate
    #[must_use]
    pub fn is_gated(&self) -> bool {
        !self.on_failure.is_empty()
    }
}

impl fmt::Display for RecipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.target, self.command)
    }
}

/// Ordered list of guarded commands representing one provisioning task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name
    pub name: String,

    /// One-line description shown in listings
    #[serde(default)]
    pub description: String,

    /// Steps executed top to bottom
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Creates an empty recipe
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step, builder style
    #[must_use]
    pub fn with_step(mut self, step: RecipeStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends several steps, builder style
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = RecipeStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Validates the recipe without executing it
    ///
    /// Checks for a non-empty name, at least one step, and that every
    /// command tokenizes. Placeholders are legal tokens, so validation does
    /// not require variable values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if self.steps.is_empty() {
            return Err(ValidationError::EmptyRecipe {
                recipe: self.name.clone(),
            });
        }

        for (i, step) in self.steps.iter().enumerate() {
            let index = i + 1;
            if step.command.trim().is_empty() {
                return Err(ValidationError::EmptyCommand {
                    recipe: self.name.clone(),
                    index,
                });
            }
            match shell_words::split(&step.command) {
                Ok(words) if words.is_empty() => {
                    return Err(ValidationError::EmptyCommand {
                        recipe: self.name.clone(),
                        index,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(ValidationError::UnparseableCommand {
                        recipe: self.name.clone(),
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} steps)", self.name, self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_constructors() {
        let local = RecipeStep::local("echo hi", "Continue?");
        let remote = RecipeStep::remote("uptime", "Continue?");
        let sudo = RecipeStep::sudo("apt-get update", "Continue?");

        assert_eq!(local.target, ExecutionTarget::Local);
        assert_eq!(remote.target, ExecutionTarget::Remote);
        assert_eq!(sudo.target, ExecutionTarget::RemotePrivileged);
        assert!(local.is_gated());
    }

    #[test]
    fn test_unguarded_step() {
        let step = RecipeStep::unguarded(ExecutionTarget::Local, "git init");
        assert!(!step.is_gated());
        assert_eq!(step.on_failure, "");
    }

    #[test]
    fn test_step_display() {
        let step = RecipeStep::sudo("service nginx start", "Continue?");
        assert_eq!(step.to_string(), "[sudo] service nginx start");
    }

    #[test]
    fn test_validate_ok() {
        let recipe = Recipe::new("deploy", "push and restart")
            .with_step(RecipeStep::local("git push production master", "Continue?"))
            .with_step(RecipeStep::sudo("supervisorctl restart {{project}}", "Continue?"));
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let recipe = Recipe::new("  ", "").with_step(RecipeStep::local("true", ""));
        assert_eq!(recipe.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_empty_recipe() {
        let recipe = Recipe::new("empty", "");
        assert_eq!(
            recipe.validate(),
            Err(ValidationError::EmptyRecipe {
                recipe: "empty".to_string()
            })
        );
    }

    #[test]
    fn test_validate_empty_command() {
        let recipe = Recipe::new("bad", "").with_step(RecipeStep::local("   ", "Continue?"));
        assert_eq!(
            recipe.validate(),
            Err(ValidationError::EmptyCommand {
                recipe: "bad".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_validate_unparseable_command() {
        let recipe =
            Recipe::new("bad", "").with_step(RecipeStep::local("echo 'oops", "Continue?"));
        assert!(matches!(
            recipe.validate(),
            Err(ValidationError::UnparseableCommand { index: 1, .. })
        ));
    }

    #[test]
    fn test_recipe_yaml_round_trip() {
        let recipe = Recipe::new("setup-repo", "create the bare repository")
            .with_step(RecipeStep::remote("mkdir -p {{repo_dir}}", "Continue?"))
            .with_step(RecipeStep::unguarded(ExecutionTarget::Local, "git init"));

        let yaml = serde_yaml::to_string(&recipe).unwrap();
        let parsed: Recipe = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, recipe);
    }
}
