// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: cache/memory.rs
// Role: In-process CacheStorage (local store, optional byte quota)
// ----------------------------------------------------------------------------

use super::bucket::Bucket;
use super::{CacheStorage, CachedResponse};
use crate::CacheError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Local facade over named buckets. Hosts without a browser cache (tests,
/// edge proxies) plug this in; the quota applies across all buckets.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<State>>,
    quota_bytes: Option<usize>,
}

#[derive(Default)]
struct State {
    buckets: HashMap<String, Bucket>,
    created: Vec<String>, // creation order for keys()
}

impl State {
    fn total_bytes(&self) -> usize {
        return self.buckets.values().map(|b| b.bytes()).sum();
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        return MemoryStorage::default();
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        return MemoryStorage { inner: Arc::default(), quota_bytes: Some(quota_bytes) };
    }

    pub fn bucket_len(&self, bucket: &str) -> usize {
        let st = self.inner.read();
        return st.buckets.get(bucket).map(|b| b.len()).unwrap_or(0);
    }

    pub fn total_bytes(&self) -> usize {
        return self.inner.read().total_bytes();
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        return Ok(self.inner.read().created.clone());
    }

    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        let st = self.inner.read();
        return Ok(st.buckets.get(bucket).and_then(|b| b.lookup(key)).cloned());
    }

    async fn insert(&self, bucket: &str, key: &str, resp: CachedResponse) -> Result<(), CacheError> {
        let mut st = self.inner.write();
        if let Some(quota) = self.quota_bytes {
            let replaced = st
                .buckets
                .get(bucket)
                .and_then(|b| b.lookup(key))
                .map(|r| r.size_bytes())
                .unwrap_or(0);
            if st.total_bytes() - replaced + resp.size_bytes() > quota {
                return Err(CacheError::QuotaExceeded(bucket.to_string()));
            }
        }
        if !st.buckets.contains_key(bucket) {
            st.created.push(bucket.to_string());
        }
        st.buckets.entry(bucket.to_string()).or_default().insert(key, resp);
        return Ok(());
    }

    async fn entry_keys(&self, bucket: &str) -> Result<Vec<String>, CacheError> {
        let st = self.inner.read();
        return Ok(st.buckets.get(bucket).map(|b| b.keys()).unwrap_or_default());
    }

    async fn invalidate(&self, bucket: &str, key: &str) -> Result<bool, CacheError> {
        let mut st = self.inner.write();
        return Ok(st.buckets.get_mut(bucket).map(|b| b.invalidate(key)).unwrap_or(false));
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        let mut st = self.inner.write();
        if st.buckets.remove(bucket).is_some() {
            st.created.retain(|n| n != bucket);
            return Ok(true);
        }
        return Ok(false);
    }
}
