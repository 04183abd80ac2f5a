//! deployline - guarded provisioning and deployment runner
//!
//! ## Commands
//!
//! - `deployline bootstrap` - Provision a fresh application server
//! - `deployline deploy` - Push code and restart the application service
//! - `deployline push` - Commit and push local changes
//! - `deployline setup-repo` - Create the bare repository on the server
//! - `deployline db migrate` - Apply database migrations
//! - `deployline hosts` - List reachable hosts from the cloud inventory
//! - `deployline completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # See what bootstrap would do, without touching the server
//! deployline bootstrap --dry-run
//!
//! # Provision the first discovered instance
//! deployline bootstrap
//!
//! # Push and restart, answering every gate with "yes"
//! deployline deploy -m "fix login redirect" --yes
//! ```

use deployline::recipe::DeployError;
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e.downcast_ref::<DeployError>(), Some(DeployError::Aborted)) {
                eprintln!("Stopped execution per operator request.");
            } else {
                eprintln!("Error: {e}");
                if std::env::var("DEPLOYLINE_VERBOSE").is_ok() {
                    eprintln!("{e:?}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
