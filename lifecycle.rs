// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: lifecycle.rs
// Role: Install / activate handling and stale generation cleanup
// ----------------------------------------------------------------------------

use crate::cache::CacheStorage;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{error, info, warn};

/// Callbacks into the runtime hosting the worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate without waiting for existing clients to close.
    async fn skip_waiting(&self);
    /// Take control of every open client page.
    async fn claim_clients(&self);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    pub claimed: bool,
}

pub async fn install(host: &dyn WorkerHost) {
    info!("service worker installing");
    host.skip_waiting().await;
}

/// Delete every bucket outside `whitelist`, then claim clients.
///
/// Completes only after all deletions settled. A failing deletion is logged
/// and recorded without stopping the others, and never fails activation.
pub async fn activate(storage: &dyn CacheStorage, host: &dyn WorkerHost, whitelist: &[String]) -> ActivationReport {
    info!("service worker activating");
    let mut report = ActivationReport::default();

    match storage.keys().await {
        Ok(names) => {
            let stale: Vec<String> = names.into_iter().filter(|n| !whitelist.contains(n)).collect();
            let results = join_all(stale.iter().map(|name| async move {
                info!(bucket = %name, "deleting stale cache");
                (name, storage.delete(name).await)
            }))
            .await;
            for (name, res) in results {
                match res {
                    Ok(_) => report.deleted.push(name.clone()),
                    Err(e) => {
                        warn!(bucket = %name, error = %e, "stale cache deletion failed");
                        report.failed.push(name.clone());
                    }
                }
            }
        }
        Err(e) => error!(error = %e, "cache cleanup failed: cannot list buckets"),
    }

    host.claim_clients().await;
    report.claimed = true;
    info!(deleted = report.deleted.len(), failed = report.failed.len(), "cache cleanup complete");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachedResponse, MemoryStorage};
    use crate::testing::{FailingStorage, RecordingHost};

    #[tokio::test]
    async fn install_skips_waiting() {
        let host = RecordingHost::default();
        install(&host).await;
        assert_eq!(host.skip_waiting_calls(), 1);
    }

    #[tokio::test]
    async fn activation_keeps_only_whitelisted_buckets() {
        let storage = MemoryStorage::new();
        for name in ["A-old", "B-images-0709"] {
            storage.insert(name, "/x", CachedResponse::ok(b"x")).await.unwrap();
        }
        let host = RecordingHost::default();
        let report = activate(&storage, &host, &["B-images-0709".to_string()]).await;
        assert_eq!(storage.keys().await.unwrap(), vec!["B-images-0709".to_string()]);
        assert_eq!(report.deleted, vec!["A-old".to_string()]);
        assert!(report.claimed);
        assert_eq!(host.claim_calls(), 1);
    }

    #[tokio::test]
    async fn one_failed_deletion_does_not_block_the_rest() {
        let storage = FailingStorage::new(&["stuck-v1"]);
        storage.inner().insert("old-v1", "/x", CachedResponse::ok(b"x")).await.unwrap();
        storage.inner().insert("keep", "/x", CachedResponse::ok(b"x")).await.unwrap();
        let host = RecordingHost::default();
        let report = activate(&storage, &host, &["keep".to_string()]).await;
        assert_eq!(report.deleted, vec!["old-v1".to_string()]);
        assert_eq!(report.failed, vec!["stuck-v1".to_string()]);
        assert_eq!(storage.inner().keys().await.unwrap(), vec!["keep".to_string()]);
        assert_eq!(host.claim_calls(), 1);
    }
}
