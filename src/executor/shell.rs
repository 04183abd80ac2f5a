//! Production command runner
//!
//! [`ShellRunner`] executes [`CommandSpec`]s against all three targets: local
//! commands are spawned directly with their argument vector, remote commands
//! go through the system `ssh` client (see [`SshSession`]). Output is
//! captured for the result and echoed to the operator's terminal, matching
//! what the original transport did.

use super::ssh::SshSession;
use super::target::{CommandResult, CommandRunner, CommandSpec, ExecutionTarget, HealthStatus};
use crate::recipe::DeployError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Configuration for the shell runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Working directory for local commands
    pub cwd: PathBuf,

    /// Extra environment variables for local commands
    pub env: HashMap<String, String>,

    /// Echo captured output to the operator's terminal
    pub echo: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            env: HashMap::new(),
            echo: true,
        }
    }
}

/// Command runner backed by local process spawn and the `ssh` client
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    config: RunnerConfig,
    session: Option<SshSession>,
}

impl ShellRunner {
    /// Creates a runner for local-only execution
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner from an explicit configuration
    #[must_use]
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Sets the working directory for local commands
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.config.cwd = cwd.into();
        self
    }

    /// Adds an environment variable for local commands
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.insert(key.into(), value.into());
        self
    }

    /// Enables or disables terminal echo of captured output
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.config.echo = echo;
        self
    }

    /// Attaches the SSH session used by remote targets
    #[must_use]
    pub fn with_session(mut self, session: SshSession) -> Self {
        self.session = Some(session);
        self
    }

    fn command_for(
        &self,
        target: ExecutionTarget,
        spec: &CommandSpec,
    ) -> Result<Command, DeployError> {
        match target {
            ExecutionTarget::Local => {
                let mut cmd = Command::new(&spec.program);
                cmd.args(&spec.args);
                cmd.current_dir(&self.config.cwd);
                cmd.envs(&self.config.env);
                Ok(cmd)
            }
            ExecutionTarget::Remote | ExecutionTarget::RemotePrivileged => {
                let session = self.session.as_ref().ok_or(DeployError::NoHost)?;
                let argv =
                    session.command_argv(spec, target == ExecutionTarget::RemotePrivileged);
                let mut cmd = Command::new(&argv[0]);
                cmd.args(&argv[1..]);
                Ok(cmd)
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(
        &self,
        target: ExecutionTarget,
        spec: &CommandSpec,
    ) -> Result<CommandResult, DeployError> {
        let mut cmd = self.command_for(target, spec)?;
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(target = %target, command = %spec, "Executing command");

        let start = Instant::now();
        let output = cmd.output().map_err(|e| DeployError::Io(e.to_string()))?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if self.config.echo {
            if !stdout.is_empty() {
                print!("{stdout}");
            }
            if !stderr.is_empty() {
                eprint!("{stderr}");
            }
        }

        if exit_code != 0 {
            tracing::debug!(target = %target, exit_code, "Command returned non-zero exit");
        }

        Ok(CommandResult {
            stdout,
            stderr,
            exit_code,
            duration,
        })
    }

    fn health_check(&self) -> HealthStatus {
        // Remote targets need a working ssh client on the operator's machine.
        let probe = if self.session.is_some() {
            Command::new("ssh").arg("-V").output()
        } else {
            Command::new("sh").arg("-c").arg("echo ok").output()
        };

        match probe {
            Ok(output) if output.status.success() => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Unhealthy {
                reason: "transport probe returned non-zero exit code".to_string(),
            },
            Err(e) => HealthStatus::Unhealthy {
                reason: format!("transport not available: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_runner() -> ShellRunner {
        ShellRunner::new().with_echo(false)
    }

    #[test]
    fn test_run_success_returns_result() {
        let runner = quiet_runner();
        let spec = CommandSpec::parse("echo hello").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert!(result.is_success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_failure_returns_result_not_error() {
        let runner = quiet_runner();
        let spec = CommandSpec::parse("sh -c 'exit 3'").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert!(result.is_failure());
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_run_captures_stderr() {
        let runner = quiet_runner();
        let spec = CommandSpec::parse("sh -c 'echo oops >&2; exit 1'").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert!(result.is_failure());
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[test]
    fn test_run_missing_program_is_transport_error() {
        let runner = quiet_runner();
        let spec = CommandSpec::new("definitely-not-a-real-binary-1b2c", vec![]);

        let result = runner.run(ExecutionTarget::Local, &spec);

        assert!(matches!(result, Err(DeployError::Io(_))));
    }

    #[test]
    fn test_remote_without_session_is_no_host() {
        let runner = quiet_runner();
        let spec = CommandSpec::parse("uptime").unwrap();

        let result = runner.run(ExecutionTarget::Remote, &spec);

        assert!(matches!(result, Err(DeployError::NoHost)));
    }

    #[test]
    fn test_run_respects_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = quiet_runner().with_cwd(temp_dir.path());
        let spec = CommandSpec::parse("pwd").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert!(result.is_success());
        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(
            reported.file_name(),
            temp_dir.path().canonicalize().unwrap().file_name()
        );
    }

    #[test]
    fn test_with_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut env = HashMap::new();
        env.insert("DEPLOYLINE_CONFIG_VAR".to_string(), "7".to_string());
        let runner = ShellRunner::with_config(RunnerConfig {
            cwd: temp_dir.path().to_path_buf(),
            env,
            echo: false,
        });
        let spec = CommandSpec::parse("sh -c 'echo $DEPLOYLINE_CONFIG_VAR'").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert_eq!(result.stdout.trim(), "7");
    }

    #[test]
    fn test_run_passes_env() {
        let runner = quiet_runner().with_env("DEPLOYLINE_TEST_VAR", "42");
        let spec = CommandSpec::parse("sh -c 'echo $DEPLOYLINE_TEST_VAR'").unwrap();

        let result = runner.run(ExecutionTarget::Local, &spec).unwrap();

        assert_eq!(result.stdout.trim(), "42");
    }

    #[test]
    fn test_local_health_check() {
        let runner = quiet_runner();
        assert!(runner.health_check().is_operational());
    }
}
