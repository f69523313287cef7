// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Operator configuration, resolved from the environment with defaults
/// under `~/.fleetmon/`.
#[derive(Debug, Clone)]
pub struct Config {
    pub directory_url: String,
    pub username: String,
    pub password: Option<String>,
    pub customer_ids: Vec<String>,
    pub cache_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".fleetmon");

        let directory_url = env::var("FLEETMON_DIRECTORY_URL")
            .context("FLEETMON_DIRECTORY_URL must point at the directory service")?;
        let username = env::var("FLEETMON_USER")
            .or_else(|_| env::var("USER"))
            .context("neither FLEETMON_USER nor USER is set")?;

        // Credentials are owned by the directory service; we only read
        // the operator's password file, if it exists.
        let password_file = env::var("FLEETMON_PASSWORD_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("directory.pw"));
        let password = fs::read_to_string(&password_file)
            .ok()
            .map(|s| s.trim_end().to_string())
            .filter(|s| !s.is_empty());

        // One customer sys_id per line.
        let customers_file = env::var("FLEETMON_CUSTOMERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("customers.txt"));
        let customer_ids: Vec<String> = fs::read_to_string(&customers_file)
            .with_context(|| {
                format!(
                    "cannot read the customer list at {}",
                    customers_file.display()
                )
            })?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Ok(Self {
            directory_url,
            username,
            password,
            customer_ids,
            cache_path: base.join("directory_cache.json"),
        })
    }
}
