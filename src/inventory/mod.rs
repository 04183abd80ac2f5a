//! Cloud instance inventory (host discovery)
//!
//! The execution target set is rebuilt on every process start by asking the
//! cloud provider which instances are running. The provider answers with
//! nested reservation records; callers only care about a flat, stably
//! ordered list of public addresses, so `hosts[0]` means the same machine
//! across invocations.

pub mod http;

pub use http::HttpInventoryClient;

use crate::recipe::DeployError;
use serde::{Deserialize, Serialize};

/// One running compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Provider-assigned instance id
    #[serde(rename = "instanceId")]
    pub instance_id: String,

    /// Public address; empty for instances without one
    #[serde(rename = "publicDnsName", default)]
    pub public_dns_name: String,
}

/// A reservation grouping one or more instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Instances launched under this reservation
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// Wire shape of a describe-instances response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeInstancesResponse {
    /// Reservations in provider order
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

/// Ordered list of reachable host addresses, sorted ascending
pub type HostList = Vec<String>;

/// Trait for discovering reachable hosts
///
/// One call per process start; failures propagate, there is no retry.
pub trait InventoryClient: Send + Sync {
    /// Queries the inventory and returns the sorted host list
    fn discover_hosts(&self) -> Result<HostList, DeployError>;
}

/// Flattens nested reservation records into a sorted host list
///
/// Instances without a public address are dropped; duplicates collapse. The
/// result order is independent of the provider's nesting and ordering.
#[must_use]
pub fn flatten_reservations(response: &DescribeInstancesResponse) -> HostList {
    let mut hosts: Vec<String> = response
        .reservations
        .iter()
        .flat_map(|reservation| reservation.instances.iter())
        .filter(|instance| !instance.public_dns_name.is_empty())
        .map(|instance| instance.public_dns_name.clone())
        .collect();

    hosts.sort();
    hosts.dedup();
    hosts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn instance(id: &str, dns: &str) -> Instance {
        Instance {
            instance_id: id.to_string(),
            public_dns_name: dns.to_string(),
        }
    }

    #[test]
    fn test_flatten_two_reservations_two_instances_each() {
        let response = DescribeInstancesResponse {
            reservations: vec![
                Reservation {
                    instances: vec![instance("i-1", "host-b"), instance("i-2", "host-d")],
                },
                Reservation {
                    instances: vec![instance("i-3", "host-a"), instance("i-4", "host-c")],
                },
            ],
        };

        let hosts = flatten_reservations(&response);

        assert_eq!(hosts, vec!["host-a", "host-b", "host-c", "host-d"]);
    }

    #[test]
    fn test_flatten_is_order_independent() {
        let forward = DescribeInstancesResponse {
            reservations: vec![
                Reservation {
                    instances: vec![instance("i-1", "host-a")],
                },
                Reservation {
                    instances: vec![instance("i-2", "host-b")],
                },
            ],
        };
        let reversed = DescribeInstancesResponse {
            reservations: vec![
                Reservation {
                    instances: vec![instance("i-2", "host-b")],
                },
                Reservation {
                    instances: vec![instance("i-1", "host-a")],
                },
            ],
        };

        assert_eq!(flatten_reservations(&forward), flatten_reservations(&reversed));
    }

    #[test]
    fn test_flatten_drops_instances_without_address() {
        let response = DescribeInstancesResponse {
            reservations: vec![Reservation {
                instances: vec![instance("i-1", ""), instance("i-2", "host-a")],
            }],
        };

        assert_eq!(flatten_reservations(&response), vec!["host-a"]);
    }

    #[test]
    fn test_flatten_dedupes() {
        let response = DescribeInstancesResponse {
            reservations: vec![
                Reservation {
                    instances: vec![instance("i-1", "host-a")],
                },
                Reservation {
                    instances: vec![instance("i-1", "host-a")],
                },
            ],
        };

        assert_eq!(flatten_reservations(&response), vec!["host-a"]);
    }

    #[test]
    fn test_flatten_empty_response() {
        let response = DescribeInstancesResponse {
            reservations: vec![],
        };
        assert!(flatten_reservations(&response).is_empty());
    }

    #[test]
    fn test_response_deserializes_from_json() {
        let json = r#"{
            "reservations": [
                {"instances": [
                    {"instanceId": "i-0abc", "publicDnsName": "host-b.example.com"},
                    {"instanceId": "i-0def"}
                ]},
                {"instances": [
                    {"instanceId": "i-0ghi", "publicDnsName": "host-a.example.com"}
                ]}
            ]
        }"#;

        let response: DescribeInstancesResponse = serde_json::from_str(json).unwrap();
        let hosts = flatten_reservations(&response);

        assert_eq!(hosts, vec!["host-a.example.com", "host-b.example.com"]);
    }
}
