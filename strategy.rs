// =============================================================================
// SWCACHE - Storefront Worker Cache
// File: strategy.rs
// Role: Cache-first strategy per resource class
// -----------------------------------------------------------------------------
// Responsibilities:
// - Serve from the class bucket when the serve filters allow it.
// - Fetch on miss, store when the store filters allow it, then trim.
// - Only network failures reach the caller; cache failures become misses.
// =============================================================================

use crate::cache::{CacheStorage, CachedResponse, Expiration};
use crate::meta;
use crate::observability::metrics::{EngineCounters, Event};
use crate::plugins::{FilterChain, FilterVerdict};
use crate::routing::classifier::{Request, ResourceClass};
use crate::EngineError;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Network collaborator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, req: &Request) -> Result<CachedResponse, EngineError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub response: CachedResponse,
    pub flags: u32,
}

/// Shared handles a strategy needs while serving one request.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub storage: &'a dyn CacheStorage,
    pub fetcher: &'a dyn Fetcher,
    pub counters: &'a EngineCounters,
}

pub struct RouteHandler {
    pub class: ResourceClass,
    pub bucket: String,
    pub filters: FilterChain,
    pub expiration: Expiration,
}

impl RouteHandler {
    /// Cache first, network on miss. A network failure on a miss is the
    /// only error returned.
    pub async fn handle(&self, req: &Request, ctx: Collaborators<'_>) -> Result<Outcome, EngineError> {
        let flags = self.class.meta_flag();
        if let Some(hit) = self.cached(req, ctx).await {
            ctx.counters.record(self.class, Event::Hit);
            return Ok(Outcome { response: hit, flags: flags | meta::CACHE_HIT });
        }
        ctx.counters.record(self.class, Event::Miss);
        ctx.counters.record(self.class, Event::Fetch);
        let resp = ctx.fetcher.fetch(req).await?;
        let stored = self.store(req, &resp, ctx).await;
        Ok(Outcome { response: resp, flags: flags | meta::CACHE_MISS | stored })
    }

    async fn cached(&self, req: &Request, ctx: Collaborators<'_>) -> Option<CachedResponse> {
        let url = req.url();
        let found = match ctx.storage.lookup(&self.bucket, &url).await {
            Ok(found) => found,
            Err(e) => {
                warn!(bucket = %self.bucket, url = %url, error = %e, "cache read failed, treating as miss");
                return None;
            }
        }?;
        match self.filters.admit_serve(&found) {
            FilterVerdict::Continue => Some(found),
            FilterVerdict::Reject(why) => {
                debug!(bucket = %self.bucket, url = %url, reason = %why, "cached entry not served");
                None
            }
        }
    }

    /// Returns the meta flags describing what happened to the bucket.
    async fn store(&self, req: &Request, resp: &CachedResponse, ctx: Collaborators<'_>) -> u32 {
        let url = req.url();
        if let FilterVerdict::Reject(why) = self.filters.admit_store(resp) {
            ctx.counters.record(self.class, Event::Rejected);
            debug!(bucket = %self.bucket, url = %url, reason = %why, "response not stored");
            return 0;
        }
        if let Err(e) = ctx.storage.insert(&self.bucket, &url, resp.clone()).await {
            if self.expiration.on_write_error(ctx.storage, &self.bucket, &e).await {
                ctx.counters.record(self.class, Event::Purge);
                return meta::CACHE_PURGED;
            }
            warn!(bucket = %self.bucket, url = %url, error = %e, "cache write failed");
            return 0;
        }
        ctx.counters.record(self.class, Event::Store);
        self.expiration.enforce(ctx.storage, &self.bucket).await;
        meta::CACHE_STORED
    }
}
