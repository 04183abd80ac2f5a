//! Convenience re-exports for building and running recipes
//!
//! ```rust
//! use deployline::prelude::*;
//!
//! let recipe = Recipe::new("greet", "say hello")
//!     .with_step(RecipeStep::local("echo hello", "Couldn't greet, continue anyway?"));
//! assert!(recipe.validate().is_ok());
//! ```

pub use crate::executor::{
    CommandResult, CommandRunner, CommandSpec, ExecutionTarget, ShellRunner, SshSession,
};
pub use crate::infrastructure::DeployConfig;
pub use crate::inventory::{HostList, InventoryClient};
pub use crate::recipe::{
    Confirmer, DeployError, Recipe, RecipeStep, ScriptedConfirmer, Sequencer, TerminalConfirmer,
    Vars, catalog,
};
