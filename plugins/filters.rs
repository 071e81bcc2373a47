// =============================================================================
// SWCACHE - Storefront Worker Cache
// File: plugins/filters.rs
// Role: Response filters (ordered, pure, short-circuiting)
// -----------------------------------------------------------------------------
// Responsibilities:
// - Gate what a strategy may write into a bucket (after fetch, before store).
// - Gate what a strategy may serve from a bucket (after lookup, before use).
// - Deterministic order: the first rejecting filter decides.
// =============================================================================

use crate::cache::CachedResponse;
use crate::routing::classifier::ResourceClass;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterVerdict {
    Continue,
    Reject(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseFilter {
    /// Admit only these status codes (0 stands for opaque responses).
    CacheableStatus(Vec<u16>),
    /// Refuse opaque responses outright.
    RejectOpaque,
}

impl ResponseFilter {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseFilter::CacheableStatus(_) => "cacheable_status",
            ResponseFilter::RejectOpaque => "reject_opaque",
        }
    }

    pub fn apply(&self, resp: &CachedResponse) -> FilterVerdict {
        match self {
            ResponseFilter::CacheableStatus(statuses) => {
                if statuses.contains(&resp.status) {
                    FilterVerdict::Continue
                } else {
                    FilterVerdict::Reject(format!("status {} not cacheable", resp.status))
                }
            }
            ResponseFilter::RejectOpaque => {
                if resp.is_opaque() {
                    FilterVerdict::Reject("opaque response".to_string())
                } else {
                    FilterVerdict::Continue
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    will_store: Vec<ResponseFilter>,
    will_serve: Vec<ResponseFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock chain for a resource class.
    pub fn for_class(class: ResourceClass) -> Self {
        match class {
            ResourceClass::Image | ResourceClass::StaticFont => {
                Self::new().before_store(ResponseFilter::CacheableStatus(vec![0, 200]))
            }
            ResourceClass::ThirdPartyCdn => Self::new()
                .before_store(ResponseFilter::CacheableStatus(vec![200]))
                .before_serve(ResponseFilter::RejectOpaque),
            ResourceClass::Other => Self::new(),
        }
    }

    pub fn before_store(mut self, f: ResponseFilter) -> Self {
        self.will_store.push(f);
        self
    }

    pub fn before_serve(mut self, f: ResponseFilter) -> Self {
        self.will_serve.push(f);
        self
    }

    pub fn admit_store(&self, resp: &CachedResponse) -> FilterVerdict {
        run(&self.will_store, resp)
    }

    pub fn admit_serve(&self, resp: &CachedResponse) -> FilterVerdict {
        run(&self.will_serve, resp)
    }
}

fn run(chain: &[ResponseFilter], resp: &CachedResponse) -> FilterVerdict {
    for f in chain {
        if let FilterVerdict::Reject(why) = f.apply(resp) {
            return FilterVerdict::Reject(format!("{}: {}", f.name(), why));
        }
    }
    FilterVerdict::Continue
}
