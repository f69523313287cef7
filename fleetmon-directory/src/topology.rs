// SPDX-License-Identifier: MIT

use crate::{Directory, Filter, QUERY_LIMIT};
use fleetmon_model::{CapacityInfo, DirectoryError, Instance, NodeRecord, Topology};
use tracing::{debug, info};

const DB_CATALOG_TABLE: &str = "cmdb_ci_db_catalog";
const DB_INSTANCE_TABLE: &str = "cmdb_ci_db_mysql_instance";
const NODE_TABLE: &str = "service_now_node";

impl Directory {
    /// Assembles the full node topology for one instance from three
    /// chained directory lookups: discovered catalog entries, the
    /// database instances they reference, and the raw node records.
    ///
    /// Missing attributes stay empty; only an unreachable directory is an
    /// error. The assembled topology is cached as a single entry — a
    /// partially resolved one never is.
    pub async fn resolve_topology(
        &mut self,
        instance: &Instance,
    ) -> Result<Topology, DirectoryError> {
        let cache_key = format!("topology:{}", instance.instance_id);
        if let Some(cached) = self.cache.get::<Topology>(&cache_key) {
            debug!(instance = %instance.name, "topology served from cache");
            return Ok(cached);
        }

        let mut topology = Topology::default();

        // Catalog entries discovered for this instance.
        let filter = Filter::new()
            .eq("u_discovered_instance_id", &instance.instance_id)
            .eq("operational_status", "1");
        let catalog = self
            .client
            .query(DB_CATALOG_TABLE, "sys_id", &filter, QUERY_LIMIT)
            .await?;
        let mut catalog_ids: Vec<String> = Vec::new();
        for (_, r) in &catalog {
            let id = &r.dv_database_instance;
            if !id.is_empty() && !catalog_ids.contains(id) {
                catalog_ids.push(id.clone());
            }
        }

        // The database instances those entries reference, routed by usage.
        let filter = Filter::new().is_in("name", &catalog_ids);
        let databases = self
            .client
            .query(DB_INSTANCE_TABLE, "name", &filter, QUERY_LIMIT)
            .await?;
        for (_, r) in &databases {
            let info = CapacityInfo {
                host: r.dv_u_host.clone(),
                port: r.tcp_port.clone(),
                capacity_size: r.dv_u_capacity_size.clone(),
                desired_capacity_size: r.dv_u_desired_capacity_size.clone(),
                discovered_capacity_size: r.dv_u_disco_capacity_size.clone(),
            };
            match r.u_usage.as_str() {
                "primary" => topology.primary = info,
                "standby" => topology.standby = Some(info),
                "read_replica" => topology.replicas.push(info),
                _ => {}
            }
        }

        // Raw node records, scoped by instance name.
        let filter = Filter::new().eq("instance_name", &instance.name);
        let nodes = self
            .client
            .query(NODE_TABLE, "sys_id", &filter, QUERY_LIMIT)
            .await?;
        for (_, r) in &nodes {
            topology.push_node(NodeRecord {
                host: r.dv_u_host.clone(),
                port: r.tcp_port.clone(),
                name: r.name.clone(),
                scheduler_state: r.u_scheduler_state.clone(),
            });
        }

        info!(
            instance = %instance.name,
            replicas = topology.replicas.len(),
            nodes = topology.nodes.len(),
            "topology resolved"
        );
        self.cache.put(&cache_key, &topology);
        Ok(topology)
    }
}
