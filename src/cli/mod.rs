//! CLI surface for deployline
//!
//! Subcommands map one-to-one onto the built-in recipes plus host discovery
//! and shell completions:
//! - `bootstrap`: provision a fresh application server
//! - `deploy`: push code and restart the application service
//! - `push`: commit and push local changes without a restart
//! - `setup-repo`: create the bare repository and working checkout
//! - `db`: database management commands
//! - `collectstatic`: collect static assets
//! - `run`: run a single guarded command against a target
//! - `hosts`: list reachable hosts from the cloud inventory
//! - `recipes`: list or export the built-in recipes
//! - `completions`: generate shell completions

pub mod completions;
pub mod hosts;
pub mod tasks;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use deployline::executor::ExecutionTarget;
use deployline::infrastructure::DeployConfig;
use deployline::recipe::{Recipe, RecipeStep, catalog};
use std::path::PathBuf;

/// CLI arguments for deployline
#[derive(Parser, Debug)]
#[command(name = "deployline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (YAML); environment variables are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Target host override (skips inventory discovery)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Answer "yes" at every confirmation gate
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Validate and print steps without executing them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision a fresh server: packages, database, supervisor, reverse proxy
    Bootstrap,

    /// Push code and restart the application service
    Deploy {
        /// Commit message (prompted when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Commit local changes and push them to the origin and production remotes
    Push {
        /// Commit message (prompted when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Create the bare repository and working checkout on the server
    SetupRepo,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommand),

    /// Collect static assets for production serving
    Collectstatic,

    /// Run a single guarded command against a target
    Run {
        /// Command to execute (quote it as one argument)
        command: String,

        /// Execution target
        #[arg(short, long, value_enum, default_value_t = TargetArg::Local)]
        target: TargetArg,

        /// Question asked on failure; an empty prompt tolerates the failure
        #[arg(short, long, default_value = "Command failed, continue anyway?")]
        prompt: String,
    },

    /// List reachable hosts from the cloud inventory
    Hosts {
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<HostsFormatArg>,
    },

    /// List or export the built-in recipes
    Recipes {
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<RecipesFormatArg>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Apply database migrations, optionally for a single app
    Migrate {
        /// App to migrate (site-wide when omitted)
        app: Option<String>,
    },

    /// Generate database migrations from model changes
    Makemigrations,

    /// Create an administrative account
    Createsuperuser,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    Local,
    Remote,
    Sudo,
}

impl From<TargetArg> for ExecutionTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Local => Self::Local,
            TargetArg::Remote => Self::Remote,
            TargetArg::Sudo => Self::RemotePrivileged,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum HostsFormatArg {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RecipesFormatArg {
    Text,
    Yaml,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    let config = DeployConfig::load(args.config.as_deref())
        .context("failed to load the configuration")?;

    deployline::init_logging(&config.log_level);

    let opts = tasks::RunOptions {
        assume_yes: args.yes,
        dry_run: args.dry_run,
        host: args.host.clone(),
    };

    match args.command {
        Command::Bootstrap => {
            tasks::execute(&config, &catalog::bootstrap(&config.env_exports), &opts)?;
        }
        Command::Deploy { message } => {
            let message = tasks::commit_message(message)?;
            tasks::execute(&config, &catalog::deploy(&message), &opts)?;
        }
        Command::Push { message } => {
            let message = tasks::commit_message(message)?;
            tasks::execute(&config, &catalog::update_code(&message), &opts)?;
        }
        Command::SetupRepo => {
            tasks::execute(&config, &catalog::setup_repo(), &opts)?;
        }
        Command::Db(db) => {
            let recipe = match db {
                DbCommand::Migrate { app } => catalog::migrate(app.as_deref()),
                DbCommand::Makemigrations => catalog::makemigrations(),
                DbCommand::Createsuperuser => catalog::createsuperuser(),
            };
            tasks::execute(&config, &recipe, &opts)?;
        }
        Command::Collectstatic => {
            tasks::execute(&config, &catalog::collectstatic(), &opts)?;
        }
        Command::Run {
            command,
            target,
            prompt,
        } => {
            let recipe = Recipe::new("run", "ad-hoc guarded command").with_step(RecipeStep {
                target: target.into(),
                command,
                on_failure: prompt,
            });
            tasks::execute(&config, &recipe, &opts)?;
        }
        Command::Hosts { format } => {
            let format = match format {
                Some(HostsFormatArg::Json) => hosts::HostsFormat::Json,
                Some(HostsFormatArg::Text) | None => hosts::HostsFormat::Text,
            };
            let listing = hosts::list_hosts(&config, format)?;
            println!("{listing}");
        }
        Command::Recipes { format } => {
            let listing = match format {
                Some(RecipesFormatArg::Yaml) => {
                    serde_yaml::to_string(&catalog::all(&config.env_exports))
                        .context("failed to render recipes as YAML")?
                }
                Some(RecipesFormatArg::Text) | None => catalog::all(&config.env_exports)
                    .iter()
                    .map(|recipe| {
                        format!(
                            "{:<16} {:>2} steps  {}",
                            recipe.name,
                            recipe.steps.len(),
                            recipe.description
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            println!("{listing}");
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let mut cmd = Args::command();
            let script = completions::generate_completions(shell, &mut cmd)?;

            if let Some(path) = output {
                completions::save_completions(&script, &path)?;
            } else {
                println!("{script}");
            }
        }
    }

    Ok(())
}
