// SPDX-License-Identifier: MIT

use fleetmon_model::{Anomaly, TelemetrySample, Topology};

/// Capacity class that suppresses the mismatch signal and gets its own
/// minimum-size check instead.
const XXLARGE: &str = "xxlarge";
/// An xxlarge cluster is expected to run at least this many node
/// endpoints across the fleet.
const MIN_XXLARGE_NODES: usize = 8;
/// The fleet is split across exactly two datacenters by convention.
const DATACENTER_COUNT: usize = 2;
const SECONDS_PER_MINUTE: f64 = 60.0;
/// Sustained transactions-per-second ceiling.
const MAX_TPS: f64 = 100.0;

/// Pure decision logic over a resolved topology and its probe results.
/// No I/O; the sample sequence is treated as unordered (concurrent
/// completion order is not meaningful).
pub fn evaluate(topology: &Topology, samples: &[TelemetrySample]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    let primary = &topology.primary;
    let has_xxlarge =
        primary.capacity_size == XXLARGE || primary.desired_capacity_size == XXLARGE;

    if primary.desired_capacity_size != primary.capacity_size && !has_xxlarge {
        anomalies.push(Anomaly::CapacityMismatch {
            current: primary.capacity_size.clone(),
            desired: primary.desired_capacity_size.clone(),
        });
    }

    if topology.nodes.len() < MIN_XXLARGE_NODES && has_xxlarge {
        anomalies.push(Anomaly::UndersizedCluster {
            nodes_per_datacenter: topology.nodes.len() / DATACENTER_COUNT,
        });
    }

    // First qualifying sample, not the maximum.
    for sample in samples {
        if let Some(mean) = sample.mean_transactions {
            if mean / SECONDS_PER_MINUTE > MAX_TPS {
                anomalies.push(Anomaly::HighTransactionRate {
                    mean_per_minute: mean,
                });
                break;
            }
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmon_model::{CapacityInfo, NodeRecord};

    fn topology(current: &str, desired: &str, node_count: usize) -> Topology {
        let mut topology = Topology {
            primary: CapacityInfo {
                host: "h1".into(),
                port: "3306".into(),
                capacity_size: current.into(),
                desired_capacity_size: desired.into(),
                discovered_capacity_size: String::new(),
            },
            ..Topology::default()
        };
        for i in 0..node_count {
            topology.push_node(NodeRecord {
                host: format!("app{}", i),
                port: "16001".into(),
                name: format!("app{}", i),
                scheduler_state: "on".into(),
            });
        }
        topology
    }

    fn sample(mean: Option<f64>) -> TelemetrySample {
        TelemetrySample {
            node_url: "http://app:16001/xmlstats.do?include=transactions".into(),
            mean_transactions: mean,
        }
    }

    #[test]
    fn capacity_mismatch_fires_on_divergence() {
        let anomalies = evaluate(&topology("medium", "large", 4), &[]);
        assert_eq!(
            anomalies,
            vec![Anomaly::CapacityMismatch {
                current: "medium".into(),
                desired: "large".into(),
            }]
        );
    }

    #[test]
    fn xxlarge_sentinel_suppresses_mismatch() {
        let anomalies = evaluate(&topology("large", "xxlarge", 8), &[]);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn matching_capacities_are_quiet() {
        assert!(evaluate(&topology("large", "large", 4), &[]).is_empty());
    }

    #[test]
    fn undersized_xxlarge_reports_per_datacenter_count() {
        let anomalies = evaluate(&topology("xxlarge", "xxlarge", 6), &[]);
        assert_eq!(
            anomalies,
            vec![Anomaly::UndersizedCluster {
                nodes_per_datacenter: 3
            }]
        );
    }

    #[test]
    fn full_size_xxlarge_is_quiet() {
        assert!(evaluate(&topology("xxlarge", "xxlarge", 8), &[]).is_empty());
    }

    #[test]
    fn small_cluster_without_xxlarge_is_quiet() {
        assert!(evaluate(&topology("large", "large", 2), &[]).is_empty());
    }

    #[test]
    fn high_load_threshold_is_exclusive() {
        // 6000/60 = 100 tps exactly: not above the ceiling.
        let quiet = evaluate(&topology("large", "large", 4), &[sample(Some(6000.0))]);
        assert!(quiet.is_empty());

        // 6060/60 = 101 tps: fires.
        let loud = evaluate(&topology("large", "large", 4), &[sample(Some(6060.0))]);
        assert_eq!(
            loud,
            vec![Anomaly::HighTransactionRate {
                mean_per_minute: 6060.0
            }]
        );
    }

    #[test]
    fn first_qualifying_sample_wins_not_the_maximum() {
        // Deliberate: the scan short-circuits on the first sample above
        // the ceiling even when a later one is higher. The sample order
        // is completion order, so which qualifying node gets reported is
        // arbitrary; only the fact of the signal is stable.
        let anomalies = evaluate(
            &topology("large", "large", 4),
            &[
                sample(None),
                sample(Some(7000.0)),
                sample(Some(9000.0)),
            ],
        );
        assert_eq!(
            anomalies,
            vec![Anomaly::HighTransactionRate {
                mean_per_minute: 7000.0
            }]
        );
    }

    #[test]
    fn nodes_without_readings_are_skipped() {
        let anomalies = evaluate(
            &topology("large", "large", 4),
            &[sample(None), sample(None)],
        );
        assert!(anomalies.is_empty());
    }
}
