// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: lib.rs
// Role: Crate facade (module map, unified errors, route meta flags)
// Philosophy: One immutable policy per deployment, first and last.
// ----------------------------------------------------------------------------

#![forbid(unsafe_code)]
#![allow(clippy::needless_return)]

pub mod cache;
pub mod config;
pub mod lifecycle;
pub mod messages;
pub mod observability;
pub mod plugins;
pub mod routing;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStorage, CachedResponse, ResponseKind};
pub use config::{ConfigError, WorkerConfig};
pub use routing::classifier::{Classifier, Request, ResourceClass};
pub use strategy::{Fetcher, RouteHandler};
pub use worker::{ServiceWorker, WorkerEvent, WorkerState};

/// Meta flags attached to every fetch outcome (frozen)
pub mod meta {
    pub const ROUTE_OTHER: u32  = 0x0000_0000;
    pub const ROUTE_IMAGE: u32  = 0x0000_0001;
    pub const ROUTE_CDN: u32    = 0x0000_0002;
    pub const ROUTE_STATIC: u32 = 0x0000_0004;

    pub const CACHE_MISS: u32   = 0x0001_0000;
    pub const CACHE_HIT: u32    = 0x0002_0000;
    pub const CACHE_STORED: u32 = 0x0004_0000;
    pub const CACHE_PURGED: u32 = 0x0008_0000;
}

/// Cache storage errors (frozen)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache bucket '{0}' not found")]
    NotFound(String),
    #[error("storage quota exceeded while writing to '{0}'")]
    QuotaExceeded(String),
    #[error("cache storage failure: {0}")]
    Storage(String),
}

/// Errors surfaced to the caller of a fetch.
///
/// Only the network can fail a request: cache failures are downgraded to
/// misses before they reach this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("network fetch failed: {0}")]
    Network(String),
}
