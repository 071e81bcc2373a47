// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: cache/bucket.rs
// Role: Insertion-ordered bucket (oldest-first enumeration)
// ----------------------------------------------------------------------------

use super::CachedResponse;
use std::collections::{HashMap, VecDeque};

#[derive(Default, Debug)]
pub struct Bucket {
    map: HashMap<String, CachedResponse>,
    order: VecDeque<String>, // least-recently-added at the front
    bytes: usize,
}

impl Bucket {
    pub fn new() -> Self {
        return Bucket::default();
    }

    pub fn len(&self) -> usize {
        return self.map.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.map.is_empty();
    }

    pub fn bytes(&self) -> usize {
        return self.bytes;
    }

    pub fn lookup(&self, key: &str) -> Option<&CachedResponse> {
        return self.map.get(key);
    }

    /// Insert or overwrite. A rewritten key counts as newly added.
    pub fn insert(&mut self, key: &str, resp: CachedResponse) {
        let size = resp.size_bytes();
        if let Some(prev) = self.map.insert(key.to_string(), resp) {
            self.bytes -= prev.size_bytes();
            self.order.retain(|k| k != key);
        }
        self.order.push_back(key.to_string());
        self.bytes += size;
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        if let Some(prev) = self.map.remove(key) {
            self.bytes -= prev.size_bytes();
            // linear scan, bounded by max entries
            self.order.retain(|k| k != key);
            return true;
        }
        return false;
    }

    pub fn keys(&self) -> Vec<String> {
        return self.order.iter().cloned().collect();
    }
}
