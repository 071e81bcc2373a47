// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: observability/mod.rs
// Role: Cache statistics and engine counters
// ----------------------------------------------------------------------------

pub mod metrics;
pub mod stats;

pub use metrics::{CounterSnapshot, EngineCounters};
pub use stats::{BucketCount, CacheStats};
