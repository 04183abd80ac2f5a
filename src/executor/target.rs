//! Execution targets and command results
//!
//! This module defines the contract of the guarded command runner: a command
//! is a structured program + argument list aimed at a target context, and its
//! outcome is always reported as a result, never as an error. A non-zero exit
//! is a normal outcome that the confirmation gate turns into an operator
//! decision; `Err` is reserved for transport problems (the command could not
//! be spawned at all).

use crate::recipe::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Context a command executes against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTarget {
    /// Spawn on the operator's machine
    Local,

    /// Run on the target host over SSH as the configured server user
    Remote,

    /// Run on the target host over SSH with privilege escalation
    RemotePrivileged,
}

impl ExecutionTarget {
    /// Returns true if this target needs an SSH session
    #[must_use]
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
            Self::RemotePrivileged => write!(f, "sudo"),
        }
    }
}

/// Structured program + argument list
///
/// Authored command strings are tokenized once with `shell-words` instead of
/// being pasted into a shell, so operator-supplied values cannot smuggle
/// extra commands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,

    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a spec from a program and explicit arguments
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Tokenizes an authored command string into program + arguments
    pub fn parse(command: &str) -> Result<Self, DeployError> {
        let words = shell_words::split(command).map_err(|e| DeployError::BadCommand {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        let mut words = words.into_iter();
        let program = words.next().ok_or_else(|| DeployError::BadCommand {
            command: command.to_string(),
            reason: "empty command".to_string(),
        })?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Renders the spec back to a single quoted command line
    ///
    /// Used for the remote side of an SSH invocation and for logging.
    #[must_use]
    pub fn rendered(&self) -> String {
        shell_words::join(std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str)))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered())
    }
}

/// Result of one command execution
///
/// Produced once per command and consumed immediately by the confirmation
/// gate. Whatever remote state the command already changed is never undone.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Exit code (`-1` when the process was killed by a signal)
    pub exit_code: i32,

    /// Wall-clock duration of the execution
    pub duration: Duration,
}

impl CommandResult {
    /// Returns true if the command succeeded (exit code 0)
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns true if the command failed
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.exit_code != 0
    }
}

/// Trait for executing guarded commands against a target
pub trait CommandRunner: Send + Sync {
    /// Executes one command against the chosen target
    ///
    /// A non-zero exit returns `Ok` with a failed [`CommandResult`]; `Err` is
    /// reserved for transport failures (program not found, SSH client missing).
    fn run(&self, target: ExecutionTarget, spec: &CommandSpec) -> Result<CommandResult, DeployError>;

    /// Performs a health check of the underlying transport
    fn health_check(&self) -> HealthStatus;
}

/// Health status of a runner's transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Transport is usable
    Healthy,

    /// Transport is unusable
    Unhealthy {
        /// Reason for being unhealthy
        reason: String,
    },
}

impl HealthStatus {
    /// Returns true if the transport is usable
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let spec = CommandSpec::parse("apt-get update").unwrap();
        assert_eq!(spec.program, "apt-get");
        assert_eq!(spec.args, vec!["update"]);
    }

    #[test]
    fn test_parse_quoted_argument() {
        let spec = CommandSpec::parse(r#"git commit -m "first cut""#).unwrap();
        assert_eq!(spec.program, "git");
        assert_eq!(spec.args, vec!["commit", "-m", "first cut"]);
    }

    #[test]
    fn test_parse_empty_command() {
        let result = CommandSpec::parse("   ");
        assert!(matches!(result, Err(DeployError::BadCommand { .. })));
    }

    #[test]
    fn test_parse_unbalanced_quote() {
        let result = CommandSpec::parse("echo 'unterminated");
        assert!(matches!(result, Err(DeployError::BadCommand { .. })));
    }

    #[test]
    fn test_rendered_requotes_spaces() {
        let spec = CommandSpec::new("git", vec!["commit".into(), "-m".into(), "two words".into()]);
        assert_eq!(spec.rendered(), "git commit -m 'two words'");
    }

    #[test]
    fn test_target_is_remote() {
        assert!(!ExecutionTarget::Local.is_remote());
        assert!(ExecutionTarget::Remote.is_remote());
        assert!(ExecutionTarget::RemotePrivileged.is_remote());
    }

    #[test]
    fn test_result_is_success() {
        let result = CommandResult {
            stdout: "ok".to_string(),
            stderr: String::new(),
            exit_code: 0,
            duration: Duration::from_millis(5),
        };
        assert!(result.is_success());
        assert!(!result.is_failure());
    }

    #[test]
    fn test_result_is_failure() {
        let result = CommandResult {
            stdout: String::new(),
            stderr: "boom".to_string(),
            exit_code: 2,
            duration: Duration::from_millis(5),
        };
        assert!(result.is_failure());
    }

    #[test]
    fn test_health_status_operational() {
        assert!(HealthStatus::Healthy.is_operational());
        assert!(
            !HealthStatus::Unhealthy {
                reason: "no ssh client".to_string()
            }
            .is_operational()
        );
    }
}
