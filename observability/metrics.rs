// =============================================================================
// SWCACHE - Storefront Worker Cache
// File: observability/metrics.rs
// Role: Engine counters (lock-free, per class, snapshot on demand)
// -----------------------------------------------------------------------------
// Responsibilities:
// - Count hits, misses, network fetches, stores, rejections and purges.
// - Bounded memory: one fixed counter row per handled resource class.
// =============================================================================

use crate::routing::classifier::ResourceClass;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default, Debug)]
struct Row {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    stores: AtomicU64,
    rejected: AtomicU64,
    purges: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub stores: u64,
    pub rejected: u64,
    pub purges: u64,
}

#[derive(Clone, Copy, Debug)]
pub enum Event {
    Hit,
    Miss,
    Fetch,
    Store,
    Rejected,
    Purge,
}

/// Fixed rows: image, cdn, static, other.
#[derive(Default, Debug)]
pub struct EngineCounters {
    rows: [Row; 4],
}

fn slot(class: ResourceClass) -> usize {
    match class {
        ResourceClass::Image => 0,
        ResourceClass::ThirdPartyCdn => 1,
        ResourceClass::StaticFont => 2,
        ResourceClass::Other => 3,
    }
}

impl EngineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, class: ResourceClass, ev: Event) {
        let row = &self.rows[slot(class)];
        let c = match ev {
            Event::Hit => &row.hits,
            Event::Miss => &row.misses,
            Event::Fetch => &row.fetches,
            Event::Store => &row.stores,
            Event::Rejected => &row.rejected,
            Event::Purge => &row.purges,
        };
        c.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, class: ResourceClass) -> CounterSnapshot {
        let row = &self.rows[slot(class)];
        CounterSnapshot {
            hits: row.hits.load(Ordering::Relaxed),
            misses: row.misses.load(Ordering::Relaxed),
            fetches: row.fetches.load(Ordering::Relaxed),
            stores: row.stores.load(Ordering::Relaxed),
            rejected: row.rejected.load(Ordering::Relaxed),
            purges: row.purges.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_independent() {
        let m = EngineCounters::new();
        m.record(ResourceClass::Image, Event::Hit);
        m.record(ResourceClass::Image, Event::Miss);
        m.record(ResourceClass::Image, Event::Hit);
        m.record(ResourceClass::Other, Event::Fetch);
        let img = m.snapshot(ResourceClass::Image);
        assert_eq!(img.hits, 2);
        assert_eq!(img.misses, 1);
        assert_eq!(m.snapshot(ResourceClass::ThirdPartyCdn), CounterSnapshot::default());
        assert_eq!(m.snapshot(ResourceClass::Other).fetches, 1);
        assert_eq!(m.snapshot(ResourceClass::Other).hits, 0);
    }
}
