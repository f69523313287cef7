// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// One logical database-service deployment tracked in the directory.
/// Identity is the `instance_id`; `name` and `customer` are display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub customer: String,
    pub instance_id: String,
}

impl Instance {
    /// Operator-facing label: the bare name when it already carries the
    /// customer code, otherwise `name (CUSTOMER)`.
    pub fn display_label(&self) -> String {
        if self.name.starts_with(&self.customer.to_lowercase()) {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.customer)
        }
    }
}

/// A raw node endpoint behind an instance. Two records with identical
/// fields are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub host: String,
    pub port: String,
    pub name: String,
    pub scheduler_state: String,
}

/// Capacity/location attributes of one database in a topology. Directory
/// schemas are sparse; absent attributes stay empty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityInfo {
    pub host: String,
    pub port: String,
    pub capacity_size: String,
    pub desired_capacity_size: String,
    pub discovered_capacity_size: String,
}

/// The resolved node set backing one instance.
///
/// `primary` is always present once resolution succeeds (empty fields if
/// the directory had no primary row); `standby` exists only for instances
/// with a failover peer. Replica and node order follow the directory
/// response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub primary: CapacityInfo,
    pub standby: Option<CapacityInfo>,
    pub replicas: Vec<CapacityInfo>,
    pub nodes: Vec<NodeRecord>,
}

impl Topology {
    /// A port is the identity-defining field for reachability: records
    /// without one are dropped, and structural duplicates collapse to a
    /// single entry. Linear scan; node counts are low double digits.
    pub fn push_node(&mut self, node: NodeRecord) {
        if node.port.is_empty() {
            return;
        }
        if self.nodes.contains(&node) {
            return;
        }
        self.nodes.push(node);
    }
}
