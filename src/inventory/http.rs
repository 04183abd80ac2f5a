//! HTTP inventory client
//!
//! Speaks one JSON describe-instances call against an EC2-compatible
//! inventory endpoint. The HTTP work is async under the hood; the public
//! [`InventoryClient`] impl blocks on a current-thread runtime because the
//! rest of the tool is strictly sequential.

use super::{DescribeInstancesResponse, HostList, InventoryClient, flatten_reservations};
use crate::recipe::DeployError;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inventory client for an EC2-compatible describe-instances endpoint
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    endpoint: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    timeout: Duration,
}

impl HttpInventoryClient {
    /// Creates a client for the given endpoint and credentials
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn describe_instances(&self) -> Result<DescribeInstancesResponse, DeployError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DeployError::Inventory(e.to_string()))?;

        tracing::debug!(endpoint = %self.endpoint, region = %self.region, "Querying instance inventory");

        let response = client
            .get(&self.endpoint)
            .query(&[
                ("Action", "DescribeInstances"),
                ("Region", self.region.as_str()),
            ])
            .header("X-Access-Key-Id", &self.access_key_id)
            .header("X-Secret-Access-Key", &self.secret_access_key)
            .send()
            .await
            .map_err(|e| DeployError::Inventory(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeployError::Inventory(format!(
                "inventory endpoint returned {status}"
            )));
        }

        response
            .json::<DescribeInstancesResponse>()
            .await
            .map_err(|e| DeployError::Inventory(e.to_string()))
    }
}

impl InventoryClient for HttpInventoryClient {
    fn discover_hosts(&self) -> Result<HostList, DeployError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DeployError::Io(e.to_string()))?;

        let response = runtime.block_on(self.describe_instances())?;
        let hosts = flatten_reservations(&response);

        tracing::info!(hosts = hosts.len(), "Inventory discovery completed");
        Ok(hosts)
    }
}
