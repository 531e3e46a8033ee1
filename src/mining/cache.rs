//! `analyzed_fen`: a bounded eviction-on-insert cache of position signatures
//! already scored in this run. Access-order updates mean a signature that's
//! looked up again is treated as freshly used, matching an LRU's usual
//! contract; the mining loop owns this exclusively, so no locking is needed.

use indexmap::IndexMap;

use crate::board::PositionSignature;

/// Default capacity when a mining run doesn't configure one explicitly —
/// "tens of thousands" per the spec's sizing note.
pub const DEFAULT_CAPACITY: usize = 50_000;

pub struct AnalyzedCache {
    capacity: usize,
    entries: IndexMap<PositionSignature, ()>,
}

impl AnalyzedCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: IndexMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, sig: &PositionSignature) -> bool {
        self.entries.contains_key(sig)
    }

    /// Registers `sig` as analyzed, refreshing its recency if already
    /// present, and evicting the least-recently-used entry once the
    /// cache is over capacity.
    pub fn insert(&mut self, sig: PositionSignature) {
        if let Some(ix) = self.entries.get_index_of(&sig) {
            let last = self.entries.len() - 1;
            self.entries.move_index(ix, last);
            return;
        }
        self.entries.insert(sig, ());
        if self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig_of(n: u64) -> PositionSignature {
        format!("{n:016x}").parse().unwrap()
    }

    #[test]
    fn inserts_and_contains() {
        let mut cache = AnalyzedCache::with_capacity(10);
        cache.insert(sig_of(1));
        assert!(cache.contains(&sig_of(1)));
        assert!(!cache.contains(&sig_of(2)));
    }

    #[test]
    fn evicts_least_recently_used_over_capacity() {
        let mut cache = AnalyzedCache::with_capacity(2);
        cache.insert(sig_of(1));
        cache.insert(sig_of(2));
        cache.insert(sig_of(3));
        assert!(!cache.contains(&sig_of(1)));
        assert!(cache.contains(&sig_of(2)));
        assert!(cache.contains(&sig_of(3)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn re_insert_refreshes_recency() {
        let mut cache = AnalyzedCache::with_capacity(2);
        cache.insert(sig_of(1));
        cache.insert(sig_of(2));
        cache.insert(sig_of(1));
        cache.insert(sig_of(3));
        assert!(cache.contains(&sig_of(1)));
        assert!(!cache.contains(&sig_of(2)));
    }
}
