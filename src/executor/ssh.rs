//! SSH session settings and argv construction
//!
//! Remote commands are executed through the system `ssh` client with key-file
//! authentication. The argv is built here as pure data so tests can check it
//! without opening a connection.

use super::target::CommandSpec;
use std::fmt;
use std::path::PathBuf;

/// Connection settings for one target host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSession {
    host: String,
    user: String,
    identity_file: Option<PathBuf>,
    port: Option<u16>,
}

impl SshSession {
    /// Creates a session for `user@host`
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            identity_file: None,
            port: None,
        }
    }

    /// Sets the private key file used for authentication
    #[must_use]
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Sets a non-default SSH port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Returns the `user@host` destination string
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Builds the full argv for the `ssh` client binary
    ///
    /// The remote command travels as a single re-quoted string argument.
    /// `BatchMode=yes` keeps the client from blocking on a password prompt;
    /// privileged commands get a `sudo -n --` prefix on the remote side.
    #[must_use]
    pub fn command_argv(&self, spec: &CommandSpec, privileged: bool) -> Vec<String> {
        let mut argv = vec![
            "ssh".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
        ];

        if let Some(ref identity) = self.identity_file {
            argv.push("-i".to_string());
            argv.push(identity.to_string_lossy().to_string());
        }

        if let Some(port) = self.port {
            argv.push("-p".to_string());
            argv.push(port.to_string());
        }

        argv.push(self.destination());

        let remote = if privileged {
            format!("sudo -n -- {}", spec.rendered())
        } else {
            spec.rendered()
        };
        argv.push(remote);

        argv
    }
}

impl fmt::Display for SshSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(command: &str) -> CommandSpec {
        CommandSpec::parse(command).unwrap()
    }

    #[test]
    fn test_argv_minimal() {
        let session = SshSession::new("host-a.example.com", "ubuntu");
        let argv = session.command_argv(&spec("uptime"), false);
        assert_eq!(
            argv,
            vec![
                "ssh",
                "-o",
                "BatchMode=yes",
                "ubuntu@host-a.example.com",
                "uptime",
            ]
        );
    }

    #[test]
    fn test_argv_with_identity_and_port() {
        let session = SshSession::new("host-a", "deploy")
            .with_identity_file("/keys/deploy.pem")
            .with_port(2222);
        let argv = session.command_argv(&spec("true"), false);
        assert_eq!(
            argv,
            vec![
                "ssh",
                "-o",
                "BatchMode=yes",
                "-i",
                "/keys/deploy.pem",
                "-p",
                "2222",
                "deploy@host-a",
                "true",
            ]
        );
    }

    #[test]
    fn test_argv_privileged_prefixes_sudo() {
        let session = SshSession::new("host-a", "ubuntu");
        let argv = session.command_argv(&spec("apt-get update"), true);
        assert_eq!(argv.last().unwrap(), "sudo -n -- apt-get update");
    }

    #[test]
    fn test_argv_requotes_remote_command() {
        let session = SshSession::new("host-a", "ubuntu");
        let argv = session.command_argv(&spec(r#"git commit -m "two words""#), false);
        assert_eq!(argv.last().unwrap(), "git commit -m 'two words'");
    }

    #[test]
    fn test_destination() {
        let session = SshSession::new("203.0.113.7", "ubuntu");
        assert_eq!(session.destination(), "ubuntu@203.0.113.7");
    }
}
