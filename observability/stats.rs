// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: observability/stats.rs
// Role: Bucket census reported over the control channel
// ----------------------------------------------------------------------------

use crate::cache::CacheStorage;
use crate::CacheError;
use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub name: String,
    pub count: usize,
}

/// Wire shape: `{"caches":[{"name","count"}],"totalEntries","timestamp"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub caches: Vec<BucketCount>,
    pub total_entries: usize,
    pub timestamp: String,
}

impl CacheStats {
    /// Count entries of every bucket. Any enumeration failure fails the
    /// whole census.
    pub async fn collect(storage: &dyn CacheStorage) -> Result<CacheStats, CacheError> {
        let names = storage.keys().await?;
        let counts = join_all(names.iter().map(|name| async move {
            let keys = storage.entry_keys(name).await?;
            Ok::<_, CacheError>(BucketCount { name: name.clone(), count: keys.len() })
        }))
        .await;
        let caches = counts.into_iter().collect::<Result<Vec<_>, _>>()?;
        let total_entries = caches.iter().map(|c| c.count).sum();
        Ok(CacheStats {
            caches,
            total_entries,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
