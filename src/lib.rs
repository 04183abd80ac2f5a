//! # Deployline - guarded provisioning and deployment runner
//!
//! Deployline executes statically authored provisioning recipes against a
//! target server: update packages, install the database and process
//! supervisor, push code through a bare git repository, run migrations,
//! restart services. Every command is guarded: a failure is never fatal by
//! itself, it is turned into a yes/no question for the operator, and a "no"
//! stops the whole run.
//!
//! ## Design
//!
//! - **Command runner** ([`executor`]): executes one structured command
//!   against a target (local process, SSH, SSH with sudo) and always returns
//!   a result; non-zero exit is an outcome, not an error.
//! - **Confirmation gate** ([`recipe::confirm`]): the single control-flow
//!   decision point, pluggable for non-interactive runs and tests.
//! - **Sequencer** ([`recipe::sequencer`]): strictly sequential execution of
//!   an ordered recipe, no rollback, no retry.
//! - **Host discovery** ([`inventory`]): rebuilds the reachable host list
//!   from the cloud provider's instance inventory on every start, sorted for
//!   stable indexing.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod executor;
pub mod infrastructure;
pub mod inventory;
pub mod recipe;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{
    CommandResult, CommandRunner, CommandSpec, ExecutionTarget, HealthStatus, ShellRunner,
    SshSession,
};
pub use infrastructure::{DeployConfig, init_logging};
pub use inventory::{HostList, HttpInventoryClient, InventoryClient, flatten_reservations};
pub use recipe::{
    Confirmer, DeployError, Recipe, RecipeReport, RecipeStep, ScriptedConfirmer, Sequencer,
    TerminalConfirmer, ValidationError, Vars, guard,
};

/// Version of the deployline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
