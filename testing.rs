// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: testing.rs
// Role: Test doubles for the network, storage and host seams
// ----------------------------------------------------------------------------

use crate::cache::{CacheStorage, CachedResponse, MemoryStorage, ResponseKind};
use crate::lifecycle::WorkerHost;
use crate::routing::classifier::Request;
use crate::strategy::Fetcher;
use crate::{CacheError, EngineError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

enum Script {
    Respond(u16, ResponseKind),
    Fail,
}

/// Answers every request the same way and counts calls.
pub struct ScriptedFetcher {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(script: Script) -> Self {
        Self { script, calls: AtomicUsize::new(0) }
    }

    pub fn ok() -> Self {
        Self::new(Script::Respond(200, ResponseKind::Basic))
    }

    pub fn with_status(status: u16, kind: ResponseKind) -> Self {
        Self::new(Script::Respond(status, kind))
    }

    pub fn failing() -> Self {
        Self::new(Script::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, req: &Request) -> Result<CachedResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Respond(status, kind) => {
                let mut resp = CachedResponse::new(status, kind);
                if kind != ResponseKind::Opaque {
                    resp.body = format!("body of {}", req.path).into_bytes();
                }
                Ok(resp)
            }
            Script::Fail => Err(EngineError::Network(format!("offline: {}", req.url()))),
        }
    }
}

/// MemoryStorage whose listed buckets fail every operation but still
/// show up in `keys()`.
pub struct FailingStorage {
    inner: MemoryStorage,
    broken: Vec<String>,
}

impl FailingStorage {
    pub fn new(broken: &[&str]) -> Self {
        Self { inner: MemoryStorage::new(), broken: broken.iter().map(|s| s.to_string()).collect() }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    fn check(&self, bucket: &str) -> Result<(), CacheError> {
        if self.broken.iter().any(|b| b == bucket) {
            return Err(CacheError::Storage(format!("{} is broken", bucket)));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FailingStorage {
    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names = self.broken.clone();
        names.extend(self.inner.keys().await?);
        Ok(names)
    }

    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        self.check(bucket)?;
        self.inner.lookup(bucket, key).await
    }

    async fn insert(&self, bucket: &str, key: &str, resp: CachedResponse) -> Result<(), CacheError> {
        self.check(bucket)?;
        self.inner.insert(bucket, key, resp).await
    }

    async fn entry_keys(&self, bucket: &str) -> Result<Vec<String>, CacheError> {
        self.check(bucket)?;
        self.inner.entry_keys(bucket).await
    }

    async fn invalidate(&self, bucket: &str, key: &str) -> Result<bool, CacheError> {
        self.check(bucket)?;
        self.inner.invalidate(bucket, key).await
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        self.check(bucket)?;
        self.inner.delete(bucket).await
    }
}

/// Records the calls a worker makes back into its host.
#[derive(Default)]
pub struct RecordingHost {
    skip_waiting: AtomicUsize,
    claims: AtomicUsize,
}

impl RecordingHost {
    pub fn skip_waiting_calls(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn claim_calls(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
    }

    async fn claim_clients(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }
}

/// Host whose first `skip_waiting` call parks until `release`, so a test
/// can act while the worker is still installing.
#[derive(Default)]
pub struct GatedHost {
    skip_waiting: AtomicUsize,
    entered: Notify,
    gate: Notify,
}

impl GatedHost {
    /// Resolves once the first `skip_waiting` call is parked.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn skip_waiting_calls(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerHost for GatedHost {
    async fn skip_waiting(&self) {
        if self.skip_waiting.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.gate.notified().await;
        }
    }

    async fn claim_clients(&self) {}
}
