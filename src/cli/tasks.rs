//! Recipe execution glue
//!
//! Bridges the parsed CLI surface to the library: resolve the target host,
//! build the runner and confirmer, and hand the recipe to the sequencer.

use anyhow::{Context, Result};
use deployline::executor::ShellRunner;
use deployline::infrastructure::DeployConfig;
use deployline::inventory::InventoryClient;
use deployline::recipe::{Confirmer, Recipe, ScriptedConfirmer, Sequencer, TerminalConfirmer};

/// Run-wide options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Answer "yes" at every confirmation gate
    pub assume_yes: bool,

    /// Validate and print steps without executing them
    pub dry_run: bool,

    /// Target host override from the command line
    pub host: Option<String>,
}

/// Executes a recipe with the configured runner, vars and confirmer
pub fn execute(config: &DeployConfig, recipe: &Recipe, opts: &RunOptions) -> Result<()> {
    let needs_remote = recipe.steps.iter().any(|step| step.target.is_remote());

    let mut vars = config.vars();
    let mut runner = ShellRunner::new();

    if needs_remote {
        let host = resolve_host(config, opts)?;
        vars.set("host", &host);
        runner = runner.with_session(config.session(&host));
    }

    let mut confirmer: Box<dyn Confirmer> = if opts.assume_yes {
        Box::new(ScriptedConfirmer::always(true))
    } else {
        Box::new(TerminalConfirmer::new())
    };

    let mut sequencer = Sequencer::new(&runner, confirmer.as_mut()).with_vars(vars);

    if opts.dry_run {
        sequencer.dry_run(recipe)?;
        return Ok(());
    }

    let report = sequencer.execute(recipe)?;

    let tolerated = report.tolerated_failures();
    if tolerated > 0 {
        println!(
            "{}: {} steps completed, {tolerated} failed and were waved through",
            report.recipe,
            report.steps.len()
        );
    } else {
        println!("{}: {} steps completed", report.recipe, report.steps.len());
    }

    Ok(())
}

/// Resolves the target host: flag, then config, then inventory discovery
pub fn resolve_host(config: &DeployConfig, opts: &RunOptions) -> Result<String> {
    if let Some(ref host) = opts.host {
        return Ok(host.clone());
    }
    if let Some(ref host) = config.host {
        return Ok(host.clone());
    }

    let client = config
        .inventory_client()
        .context("no host configured and inventory discovery is not available")?;
    let hosts = client.discover_hosts()?;
    let host = hosts
        .first()
        .cloned()
        .context("inventory returned no reachable hosts")?;

    tracing::info!(host = %host, "Using first discovered host");
    Ok(host)
}

/// Returns the provided commit message, or prompts the operator for one
pub fn commit_message(provided: Option<String>) -> Result<String> {
    match provided {
        Some(message) => Ok(message),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Commit message")
            .interact_text()
            .context("failed to read the commit message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_host_prefers_flag_over_config() {
        let config = DeployConfig {
            host: Some("config-host".to_string()),
            ..Default::default()
        };
        let opts = RunOptions {
            host: Some("flag-host".to_string()),
            ..Default::default()
        };

        assert_eq!(resolve_host(&config, &opts).unwrap(), "flag-host");
    }

    #[test]
    fn test_resolve_host_falls_back_to_config() {
        let config = DeployConfig {
            host: Some("config-host".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_host(&config, &RunOptions::default()).unwrap(),
            "config-host"
        );
    }

    #[test]
    fn test_resolve_host_without_any_source_fails() {
        let config = DeployConfig::default();
        assert!(resolve_host(&config, &RunOptions::default()).is_err());
    }

    #[test]
    fn test_commit_message_uses_provided_value() {
        let message = commit_message(Some("fix login".to_string())).unwrap();
        assert_eq!(message, "fix login");
    }
}
