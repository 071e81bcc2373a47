// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: cache/mod.rs
// Role: Response entry and the cache storage seam
// ----------------------------------------------------------------------------

pub mod bucket;
pub mod expiration;
pub mod memory;

use async_trait::async_trait;
use std::time::SystemTime;

use crate::CacheError;

pub use expiration::Expiration;
pub use memory::MemoryStorage;

/// Response type as observed by the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Cors,
    /// Cross-origin, no inspectable status (always reported as 0).
    Opaque,
}

/// Canonical cached response (frozen)
#[derive(Clone, Debug, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: SystemTime,
}

impl CachedResponse {
    pub fn new(status: u16, kind: ResponseKind) -> Self {
        return CachedResponse {
            status,
            kind,
            headers: Vec::new(),
            body: Vec::new(),
            stored_at: SystemTime::now(),
        };
    }

    pub fn ok(body: &[u8]) -> Self {
        let mut r = Self::new(200, ResponseKind::Basic);
        r.body = body.to_vec();
        return r;
    }

    pub fn opaque() -> Self {
        return Self::new(0, ResponseKind::Opaque);
    }

    pub fn is_opaque(&self) -> bool {
        return self.kind == ResponseKind::Opaque;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_header(mut self, k: &str, v: &str) -> Self {
        self.headers.push((k.to_string(), v.to_string()));
        self
    }

    /// Approximate footprint used for quota accounting.
    pub fn size_bytes(&self) -> usize {
        let hdrs: usize = self.headers.iter().map(|(k, v)| k.len() + v.len()).sum();
        return self.body.len() + hdrs;
    }
}

/// Named, enumerable key-value store of url -> response.
///
/// Mirrors the browser `CacheStorage`: buckets are created on first write
/// and deleting an unknown bucket reports `false` rather than failing.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all existing buckets.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<CachedResponse>, CacheError>;

    async fn insert(&self, bucket: &str, key: &str, resp: CachedResponse) -> Result<(), CacheError>;

    /// Entry keys of one bucket, oldest insertion first.
    async fn entry_keys(&self, bucket: &str) -> Result<Vec<String>, CacheError>;

    async fn invalidate(&self, bucket: &str, key: &str) -> Result<bool, CacheError>;

    /// Drop a whole bucket. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> Result<bool, CacheError>;
}
