//! Guarded command execution
//!
//! A command runner that executes one structured command against a target
//! context (local process, SSH session, SSH with privilege escalation) and
//! always reports the outcome as a result instead of raising on non-zero
//! exit. The continue/abort decision lives in the confirmation gate, not
//! here.

pub mod shell;
pub mod ssh;
pub mod target;

pub use shell::{RunnerConfig, ShellRunner};
pub use ssh::SshSession;
pub use target::{CommandResult, CommandRunner, CommandSpec, ExecutionTarget, HealthStatus};
