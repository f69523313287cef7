// SPDX-License-Identifier: MIT

use crate::filter::Filter;
use async_trait::async_trait;
use fleetmon_model::DirectoryError;
use serde::{Deserialize, Serialize};

/// One row returned by the directory service.
///
/// The underlying schema is an open-ended attribute bag; every attribute
/// we consume is declared here explicitly and defaults to the empty
/// string when the service omits it. Absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryRecord {
    pub name: String,
    pub dv_customer: String,
    pub instance_id: String,
    pub u_usage: String,
    pub dv_u_host: String,
    pub tcp_port: String,
    pub dv_u_capacity_size: String,
    pub dv_u_desired_capacity_size: String,
    pub dv_u_disco_capacity_size: String,
    pub u_scheduler_state: String,
    pub dv_database_instance: String,
}

/// An ordered record set keyed by the query's key field. Order matters:
/// instance ordinals and replica positions follow the response order.
pub type RecordSet = Vec<(String, DirectoryRecord)>;

/// Transport boundary to the directory service. Query and authentication
/// mechanics live behind this trait; the resolvers only build filter
/// expressions and consume record sets.
///
/// The sole failure mode is [`DirectoryError::Unavailable`] — a record
/// that is merely missing attributes is still a record.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn query(
        &self,
        object_type: &str,
        key_field: &str,
        filter: &Filter,
        limit: u32,
    ) -> Result<RecordSet, DirectoryError>;
}
