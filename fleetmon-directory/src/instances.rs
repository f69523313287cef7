// SPDX-License-Identifier: MIT

use crate::{Directory, Filter, QUERY_LIMIT};
use fleetmon_model::{DirectoryError, Instance};
use tracing::{debug, info};

const INSTANCE_TABLE: &str = "cmdb_ci_service_now";
/// Attribute value marking production-class instances in the directory.
const PRODUCTION_INSTANCE_ATTR: &str = "a8c3333a37760000dada8c00dfbe5d04";
const INSTANCES_CACHE_KEY: &str = "instances";

impl Directory {
    /// The customer-scoped instance list, in directory response order.
    ///
    /// The customer set is operator-configured and stable between runs,
    /// so one fixed cache key covers the whole listing. Ordinal position
    /// (1-based index into the result) is meaningful downstream — the
    /// order is never re-sorted.
    pub async fn list_instances(
        &mut self,
        customer_ids: &[String],
    ) -> Result<Vec<Instance>, DirectoryError> {
        if let Some(cached) = self.cache.get::<Vec<Instance>>(INSTANCES_CACHE_KEY) {
            debug!(count = cached.len(), "instance list served from cache");
            return Ok(cached);
        }

        let filter = Filter::new()
            .is_in("customer", customer_ids)
            .eq("instance_attr", PRODUCTION_INSTANCE_ATTR)
            .eq("operational_status", "1");
        let records = self
            .client
            .query(INSTANCE_TABLE, "name", &filter, QUERY_LIMIT)
            .await?;

        let instances: Vec<Instance> = records
            .iter()
            .map(|(_, r)| Instance {
                name: r.name.clone(),
                customer: customer_code(&r.dv_customer),
                instance_id: r.instance_id.clone(),
            })
            .collect();

        info!(count = instances.len(), "instance directory refreshed");
        self.cache.put(INSTANCES_CACHE_KEY, &instances);
        Ok(instances)
    }
}

/// The display value carries trailing descriptive text; only the first
/// whitespace-delimited token is the customer code.
fn customer_code(dv_customer: &str) -> String {
    dv_customer
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}
