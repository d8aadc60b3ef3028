//! Concurrent distance cache with sharded LRU bookkeeping.
//!
//! Building a neighbourhood evaluates every unordered pair twice, once from
//! each side. For symmetric metrics the second evaluation can be served from
//! this cache. Keys are canonicalised to `(min, max)` and hashed into
//! fixed-capacity shards so eviction stays bounded under contention.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    sync::{Mutex, PoisonError},
};

use dashmap::DashMap;
use lru::LruCache;
use tracing::instrument;

use crate::dataset::ItemId;

/// Configuration for the per-build distance cache.
///
/// # Examples
/// ```
/// use neighbourly_core::DistanceCacheConfig;
/// use std::num::NonZeroUsize;
///
/// let config = DistanceCacheConfig::new(NonZeroUsize::new(1024).expect("non-zero"));
/// assert_eq!(config.max_entries().get(), 1024);
/// assert_eq!(
///     DistanceCacheConfig::default().max_entries().get(),
///     DistanceCacheConfig::DEFAULT_MAX_ENTRIES,
/// );
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DistanceCacheConfig {
    max_entries: NonZeroUsize,
}

impl DistanceCacheConfig {
    /// Default maximum number of cached distances retained before eviction.
    pub const DEFAULT_MAX_ENTRIES: usize = 1_048_576;

    /// Builds a configuration with the provided maximum capacity.
    #[must_use]
    pub fn new(max_entries: NonZeroUsize) -> Self {
        Self { max_entries }
    }

    /// Returns the maximum number of cached distances retained before eviction.
    #[must_use]
    pub fn max_entries(&self) -> NonZeroUsize {
        self.max_entries
    }
}

impl Default for DistanceCacheConfig {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(Self::DEFAULT_MAX_ENTRIES).unwrap_or(NonZeroUsize::MIN))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct PairKey<I> {
    low: I,
    high: I,
}

impl<I: Ord> PairKey<I> {
    fn new(a: I, b: I) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { low, high }
    }
}

#[derive(Debug)]
pub(crate) struct PendingMiss<I> {
    key: PairKey<I>,
}

#[derive(Debug)]
pub(crate) enum LookupOutcome<I> {
    Hit(f32),
    Miss(PendingMiss<I>),
}

const DEFAULT_LRU_SHARDS: usize = 64;
const TARGET_LRU_ENTRIES_PER_SHARD: usize = 4096;

#[derive(Debug)]
pub(crate) struct DistanceCache<I: ItemId> {
    entries: DashMap<PairKey<I>, f32>,
    shards: Vec<Mutex<LruCache<PairKey<I>, ()>>>,
}

impl<I: ItemId> DistanceCache<I> {
    pub(crate) fn new(config: DistanceCacheConfig) -> Self {
        let capacity = config.max_entries().get();
        Self {
            entries: DashMap::with_capacity(capacity),
            shards: lru_shard_capacities(capacity)
                .into_iter()
                .map(|cap| Mutex::new(LruCache::new(cap)))
                .collect(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn begin_lookup(&self, left: I, right: I) -> LookupOutcome<I> {
        let key = PairKey::new(left, right);
        let hit = self.entries.get(&key).map(|entry| *entry);
        match hit {
            Some(value) => {
                self.touch(key);
                self.record_hit();
                LookupOutcome::Hit(value)
            }
            None => {
                self.record_miss();
                LookupOutcome::Miss(PendingMiss { key })
            }
        }
    }

    /// Stores a freshly computed, already validated distance.
    pub(crate) fn complete_miss(&self, miss: PendingMiss<I>, value: f32) {
        debug_assert!(value.is_finite(), "only finite distances are cached");
        self.entries.insert(miss.key, value);
        self.touch(miss.key);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&self, key: PairKey<I>) {
        let mut usage = self
            .shard_for_key(&key)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some((evicted, ())) = usage.push(key, ()) {
            if evicted != key {
                self.entries.remove(&evicted);
                self.record_eviction();
            }
        }
    }

    fn shard_for_key(&self, key: &PairKey<I>) -> &Mutex<LruCache<PairKey<I>, ()>> {
        let index = if self.shards.len() == 1 {
            0
        } else {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            (hasher.finish() as usize) % self.shards.len()
        };
        &self.shards[index]
    }

    #[cfg(feature = "metrics")]
    fn record_hit(&self) {
        metrics::counter!("distance_cache_hits").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_hit(&self) {}

    #[cfg(feature = "metrics")]
    fn record_miss(&self) {
        metrics::counter!("distance_cache_misses").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_miss(&self) {}

    #[cfg(feature = "metrics")]
    fn record_eviction(&self) {
        metrics::counter!("distance_cache_evictions").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_eviction(&self) {}
}

fn lru_shard_capacities(total_capacity: usize) -> Vec<NonZeroUsize> {
    let shard_count = total_capacity
        .div_ceil(TARGET_LRU_ENTRIES_PER_SHARD)
        .clamp(1, DEFAULT_LRU_SHARDS)
        .min(total_capacity.max(1));
    let base = total_capacity / shard_count;
    let remainder = total_capacity % shard_count;

    (0..shard_count)
        .filter_map(|index| NonZeroUsize::new(base + usize::from(index < remainder)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cache(entries: usize) -> DistanceCache<u32> {
        DistanceCache::new(DistanceCacheConfig::new(
            NonZeroUsize::new(entries).expect("test capacity is non-zero"),
        ))
    }

    #[test]
    fn lookups_are_order_insensitive() {
        let cache = cache(8);
        match cache.begin_lookup(1, 2) {
            LookupOutcome::Miss(miss) => cache.complete_miss(miss, 0.75),
            LookupOutcome::Hit(_) => panic!("empty cache cannot hit"),
        }
        assert!(matches!(cache.begin_lookup(2, 1), LookupOutcome::Hit(v) if v == 0.75));
    }

    #[test]
    fn capacity_bounds_entries() {
        let cache = cache(1);
        for (left, right) in [(0, 1), (0, 2), (0, 3)] {
            if let LookupOutcome::Miss(miss) = cache.begin_lookup(left, right) {
                cache.complete_miss(miss, 1.0);
            }
        }
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.begin_lookup(3, 0), LookupOutcome::Hit(_)));
    }

    #[rstest]
    #[case::single(1, 1)]
    #[case::one_shard(4096, 1)]
    #[case::two_shards(4097, 2)]
    #[case::capped(10_000_000, DEFAULT_LRU_SHARDS)]
    fn shard_capacities_cover_total(#[case] total: usize, #[case] shards: usize) {
        let capacities = lru_shard_capacities(total);
        assert_eq!(capacities.len(), shards);
        assert_eq!(capacities.iter().map(|c| c.get()).sum::<usize>(), total);
    }
}
