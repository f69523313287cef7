// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of probing one node's stats endpoint. A node that failed to
/// answer (or answered garbage) still produces a sample, just without a
/// reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub node_url: String,
    pub mean_transactions: Option<f64>,
}

/// Signals emitted by the anomaly evaluator, consumed by the presentation
/// layer as console lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// The primary's provisioned size disagrees with what the operator
    /// asked for.
    CapacityMismatch { current: String, desired: String },
    /// An xxlarge-class cluster running with too few node endpoints.
    /// Carries the effective per-datacenter count (fleet convention:
    /// two datacenters).
    UndersizedCluster { nodes_per_datacenter: usize },
    /// A node sustaining more than 100 transactions per second. Carries
    /// the raw minute-scale mean.
    HighTransactionRate { mean_per_minute: f64 },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::CapacityMismatch { current, desired } => {
                write!(f, "desired capacity: {}, current capacity: {}", desired, current)
            }
            Anomaly::UndersizedCluster { nodes_per_datacenter } => {
                write!(
                    f,
                    "configured as xxlarge with only {} nodes per datacenter",
                    nodes_per_datacenter
                )
            }
            Anomaly::HighTransactionRate { mean_per_minute } => {
                write!(
                    f,
                    "has a node above 100 transactions per second ({})",
                    mean_per_minute
                )
            }
        }
    }
}
