//! `deployline hosts` - List reachable hosts from the cloud inventory

use anyhow::{Context, Result};
use deployline::infrastructure::DeployConfig;
use deployline::inventory::{HostList, InventoryClient};

/// Output format for the host listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostsFormat {
    /// One address per line
    Text,
    /// JSON array of addresses
    Json,
}

/// Discovers hosts and renders them in the requested format
pub fn list_hosts(config: &DeployConfig, format: HostsFormat) -> Result<String> {
    let client = config
        .inventory_client()
        .context("inventory discovery is not configured")?;
    let hosts = client.discover_hosts()?;
    render_hosts(&hosts, format)
}

fn render_hosts(hosts: &HostList, format: HostsFormat) -> Result<String> {
    match format {
        HostsFormat::Text => Ok(hosts.join("\n")),
        HostsFormat::Json => {
            serde_json::to_string_pretty(hosts).context("failed to render hosts as JSON")
        }
    }
}
