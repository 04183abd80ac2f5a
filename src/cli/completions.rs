//! `deployline completions` - Generate shell completions

use anyhow::{Context, Result};
use clap_complete::Shell;
use std::path::Path;

/// Generates completion script text for the given shell
pub fn generate_completions(shell: Shell, cmd: &mut clap::Command) -> Result<String> {
    let mut buffer = Vec::new();
    clap_complete::generate(shell, cmd, "deployline", &mut buffer);
    String::from_utf8(buffer).context("completion script is not valid UTF-8")
}

/// Writes a completion script to a file
pub fn save_completions(script: &str, path: &Path) -> Result<()> {
    std::fs::write(path, script)
        .with_context(|| format!("failed to write completions to {}", path.display()))
}
