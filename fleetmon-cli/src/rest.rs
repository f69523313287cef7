// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use async_trait::async_trait;
use fleetmon_directory::{DirectoryClient, DirectoryRecord, Filter, RecordSet};
use fleetmon_model::DirectoryError;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One row of the directory's JSON table API. The row key travels next
/// to the sparse attribute set.
#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(default)]
    sys_id: String,
    #[serde(flatten)]
    record: DirectoryRecord,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<RecordRow>,
}

/// HTTP JSON adapter for the directory service. Every transport, status,
/// or decode failure collapses into `DirectoryError::Unavailable` — the
/// resolvers don't distinguish why the directory could not answer.
pub struct RestDirectoryClient {
    base_url: String,
    username: String,
    password: Option<String>,
    client: reqwest::Client,
}

impl RestDirectoryClient {
    pub fn new(base_url: &str, username: &str, password: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building the directory HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password,
            client,
        })
    }
}

#[async_trait]
impl DirectoryClient for RestDirectoryClient {
    async fn query(
        &self,
        object_type: &str,
        key_field: &str,
        filter: &Filter,
        limit: u32,
    ) -> Result<RecordSet, DirectoryError> {
        let url = format!("{}/{}.do", self.base_url, object_type);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("JSONv2", ""),
                ("sysparm_query", filter.encode().as_str()),
                ("sysparm_record_count", limit.to_string().as_str()),
            ])
            .basic_auth(&self.username, self.password.as_deref())
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "{} query returned {}",
                object_type, status
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(parsed
            .records
            .into_iter()
            .map(|row| {
                let key = match key_field {
                    "name" => row.record.name.clone(),
                    _ => row.sys_id,
                };
                (key, row.record)
            })
            .collect())
    }
}
