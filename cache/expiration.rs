// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: cache/expiration.rs
// Role: Bounded bucket size (oldest-first eviction, purge on quota)
// ----------------------------------------------------------------------------

use super::CacheStorage;
use crate::CacheError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expiration {
    pub max_entries: usize,
    #[serde(default = "default_purge")]
    pub purge_on_quota_error: bool,
}

fn default_purge() -> bool {
    true
}

impl Expiration {
    pub fn new(max_entries: usize) -> Self {
        return Expiration { max_entries, purge_on_quota_error: true };
    }

    /// Evict least-recently-added entries until the bucket fits.
    /// Returns the number of evicted entries; failures are logged.
    pub async fn enforce(&self, storage: &dyn CacheStorage, bucket: &str) -> usize {
        let keys = match storage.entry_keys(bucket).await {
            Ok(k) => k,
            Err(e) => {
                warn!(bucket, error = %e, "expiration: cannot enumerate bucket");
                return 0;
            }
        };
        if keys.len() <= self.max_entries {
            return 0;
        }
        let excess = keys.len() - self.max_entries;
        let mut evicted = 0;
        for key in keys.iter().take(excess) {
            match storage.invalidate(bucket, key).await {
                Ok(true) => evicted += 1,
                Ok(false) => {}
                Err(e) => warn!(bucket, key = %key, error = %e, "expiration: eviction failed"),
            }
        }
        debug!(bucket, evicted, "expiration: bucket trimmed");
        return evicted;
    }

    /// React to a failed write. Only a quota error with purging enabled
    /// drops the bucket; returns whether a purge happened.
    pub async fn on_write_error(&self, storage: &dyn CacheStorage, bucket: &str, err: &CacheError) -> bool {
        if !matches!(err, CacheError::QuotaExceeded(_)) || !self.purge_on_quota_error {
            return false;
        }
        match storage.delete(bucket).await {
            Ok(_) => {
                warn!(bucket, "quota exceeded, bucket purged");
                return true;
            }
            Err(e) => {
                warn!(bucket, error = %e, "quota exceeded, purge failed");
                return false;
            }
        }
    }
}
