// SPDX-License-Identifier: MIT

//! Resolution layer over the external directory service: which instances
//! belong to our customers, and what nodes back each instance. Both
//! lookups are slow, so results live in a [`CacheStore`] for a day.

pub mod client;
pub mod filter;
mod instances;
mod topology;

pub use client::{DirectoryClient, DirectoryRecord, RecordSet};
pub use filter::Filter;

use fleetmon_cache::CacheStore;
use std::sync::Arc;

/// Every query asks for everything; the directory enforces its own caps.
pub(crate) const QUERY_LIMIT: u32 = 999_999;

/// The directory service's view of the fleet.
///
/// Owns the cache store for its lifetime (open once per process, access
/// is single-threaded) and a handle to whatever transport actually talks
/// to the directory.
pub struct Directory {
    client: Arc<dyn DirectoryClient>,
    cache: CacheStore,
}

impl Directory {
    pub fn new(client: Arc<dyn DirectoryClient>, cache: CacheStore) -> Self {
        Self { client, cache }
    }

    /// Persist the cache snapshot; call before the process exits.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.cache.flush()
    }
}
