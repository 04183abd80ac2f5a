//! Configuration management
//!
//! One immutable [`DeployConfig`] is constructed at startup and passed by
//! reference to every component; there is no ambient global state. Values
//! are layered: the environment first, then a YAML file on top, then CLI
//! flags applied by the caller.
//!
//! Path-like fields may themselves contain `{{placeholders}}`; they are
//! resolved against the project/user values when [`DeployConfig::vars`] is
//! built.

use crate::executor::SshSession;
use crate::inventory::HttpInventoryClient;
use crate::recipe::{DeployError, Vars, vars};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Project name, substituted into paths and service names
    pub project: String,

    /// Remote login user
    pub server_user: String,

    /// SSH private key file
    pub identity_file: Option<PathBuf>,

    /// Explicit target host; skips inventory discovery when set
    pub host: Option<String>,

    /// Bare repository directory on the target host
    pub repo_dir: String,

    /// Working checkout directory on the target host
    pub checkout_dir: String,

    /// Supervisor program name for the application service
    pub service: String,

    /// Management-command prefix (e.g. `python manage.py`)
    pub manage: String,

    /// Cloud region for inventory discovery
    pub region: Option<String>,

    /// Inventory API access key id
    pub access_key_id: Option<String>,

    /// Inventory API secret access key
    pub secret_access_key: Option<String>,

    /// Inventory endpoint override; derived from the region when unset
    pub inventory_endpoint: Option<String>,

    /// `KEY=value` pairs exported into the server user's shell profile
    /// during bootstrap
    pub env_exports: Vec<String>,

    /// Default log level; `DEPLOYLINE_LOG` overrides it at runtime
    pub log_level: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            project: "app".to_string(),
            server_user: "ubuntu".to_string(),
            identity_file: None,
            host: None,
            repo_dir: "/home/{{server_user}}/git-repos/{{project}}.git".to_string(),
            checkout_dir: "/home/{{server_user}}/servers/{{project}}".to_string(),
            service: "{{project}}".to_string(),
            manage: "python manage.py".to_string(),
            region: None,
            access_key_id: None,
            secret_access_key: None,
            inventory_endpoint: None,
            env_exports: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

/// Environment keys passed through to the server's shell profile when set
const PASSTHROUGH_EXPORTS: &[&str] = &[
    "SECRET_KEY",
    "DATABASE_URL",
    "DEBUG",
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_STORAGE_BUCKET_NAME",
];

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Fields that may appear in a config file
///
/// Every field is optional; unset fields leave the base value untouched, so
/// a file can override just `project` while environment-sourced credentials
/// survive.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileOverlay {
    project: Option<String>,
    server_user: Option<String>,
    identity_file: Option<PathBuf>,
    host: Option<String>,
    repo_dir: Option<String>,
    checkout_dir: Option<String>,
    service: Option<String>,
    manage: Option<String>,
    region: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    inventory_endpoint: Option<String>,
    env_exports: Option<Vec<String>>,
    log_level: Option<String>,
}

impl FileOverlay {
    fn from_path(path: &Path) -> Result<Self, DeployError> {
        let text = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| DeployError::Config(format!("{}: {e}", path.display())))
    }

    fn apply(self, base: &mut DeployConfig) {
        if let Some(v) = self.project {
            base.project = v;
        }
        if let Some(v) = self.server_user {
            base.server_user = v;
        }
        if let Some(v) = self.identity_file {
            base.identity_file = Some(v);
        }
        if let Some(v) = self.host {
            base.host = Some(v);
        }
        if let Some(v) = self.repo_dir {
            base.repo_dir = v;
        }
        if let Some(v) = self.checkout_dir {
            base.checkout_dir = v;
        }
        if let Some(v) = self.service {
            base.service = v;
        }
        if let Some(v) = self.manage {
            base.manage = v;
        }
        if let Some(v) = self.region {
            base.region = Some(v);
        }
        if let Some(v) = self.access_key_id {
            base.access_key_id = Some(v);
        }
        if let Some(v) = self.secret_access_key {
            base.secret_access_key = Some(v);
        }
        if let Some(v) = self.inventory_endpoint {
            base.inventory_endpoint = Some(v);
        }
        if let Some(v) = self.env_exports {
            base.env_exports = v;
        }
        if let Some(v) = self.log_level {
            base.log_level = v;
        }
    }
}

impl DeployConfig {
    /// Builds a configuration from environment variables
    ///
    /// `DEPLOYLINE_*` variables override the defaults; `AWS_REGION`,
    /// `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` feed inventory
    /// discovery.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = non_empty_env("DEPLOYLINE_PROJECT") {
            config.project = v;
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_SERVER_USER") {
            config.server_user = v;
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_IDENTITY_FILE") {
            config.identity_file = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_HOST") {
            config.host = Some(v);
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_SERVICE") {
            config.service = v;
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_MANAGE") {
            config.manage = v;
        }
        if let Some(v) = non_empty_env("DEPLOYLINE_INVENTORY_ENDPOINT") {
            config.inventory_endpoint = Some(v);
        }
        config.region = non_empty_env("AWS_REGION");
        config.access_key_id = non_empty_env("AWS_ACCESS_KEY_ID");
        config.secret_access_key = non_empty_env("AWS_SECRET_ACCESS_KEY");

        config.env_exports = PASSTHROUGH_EXPORTS
            .iter()
            .filter_map(|key| non_empty_env(key).map(|value| format!("{key}={value}")))
            .collect();

        config
    }

    /// Loads a configuration from a YAML file
    ///
    /// Missing fields fall back to the defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, DeployError> {
        let mut config = Self::default();
        FileOverlay::from_path(path)?.apply(&mut config);
        Ok(config)
    }

    /// Loads the configuration: the environment first, then file fields
    /// layered on top
    ///
    /// A file that sets only `project` keeps environment-sourced values like
    /// `AWS_REGION` intact; fields set in both places take the file's value.
    pub fn load(file: Option<&Path>) -> Result<Self, DeployError> {
        let mut config = Self::from_env();
        if let Some(path) = file {
            FileOverlay::from_path(path)?.apply(&mut config);
        }
        Ok(config)
    }

    /// Builds the variable set substituted into recipe commands
    ///
    /// Path-like fields are themselves expanded against the project and
    /// user values first, so the defaults stay templated.
    #[must_use]
    pub fn vars(&self) -> Vars {
        let base = Vars::new()
            .with("project", &self.project)
            .with("server_user", &self.server_user)
            .with("manage", &self.manage);

        let mut all = base
            .clone()
            .with("service", vars::expand(&self.service, &base))
            .with("repo_dir", vars::expand(&self.repo_dir, &base))
            .with("checkout_dir", vars::expand(&self.checkout_dir, &base));

        if let Some(ref host) = self.host {
            all.set("host", host);
        }

        all
    }

    /// Builds the SSH session for the given host
    #[must_use]
    pub fn session(&self, host: &str) -> SshSession {
        let mut session = SshSession::new(host, &self.server_user);
        if let Some(ref identity) = self.identity_file {
            session = session.with_identity_file(identity);
        }
        session
    }

    /// Builds the inventory client from region and credentials
    ///
    /// Fails when any of region, access key or secret is missing.
    pub fn inventory_client(&self) -> Result<HttpInventoryClient, DeployError> {
        let region = self
            .region
            .as_deref()
            .ok_or_else(|| DeployError::Config("inventory region is not set".to_string()))?;
        let access_key_id = self.access_key_id.as_deref().ok_or_else(|| {
            DeployError::Config("inventory access key id is not set".to_string())
        })?;
        let secret_access_key = self.secret_access_key.as_deref().ok_or_else(|| {
            DeployError::Config("inventory secret access key is not set".to_string())
        })?;

        let endpoint = match self.inventory_endpoint {
            Some(ref endpoint) => endpoint.clone(),
            None => format!("https://ec2.{region}.amazonaws.com/v1/describe-instances"),
        };

        Ok(HttpInventoryClient::new(
            endpoint,
            region,
            access_key_id,
            secret_access_key,
        ))
    }
}
