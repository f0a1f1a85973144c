//! LRU Cache Module
//!
//! Main cache engine combining the key index with the recency list.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::cache::{
    list, CacheStats, Entry, EvictionPolicy, Handle, KeyIndex, LruPolicy, OrderedIndex,
};
use crate::config::CacheConfig;
use crate::error::{ConfigError, Result};

// == LRU Cache ==
/// Fixed-capacity key/value cache that evicts the least recently used entry.
///
/// `get`, `put` and `remove` run in O(1) average time. `M` is optional
/// per-entry metadata the cache stores but never reads. `P` chooses the
/// eviction victim and defaults to plain LRU.
///
/// The cache is not internally synchronized. Share it across threads by
/// wrapping the whole instance in a lock.
pub struct LruCache<K, V, M = (), P = LruPolicy> {
    /// Key to node lookup
    index: KeyIndex<K>,
    /// Entries in recency order, most recent first
    order: OrderedIndex<Entry<K, V, M>>,
    /// Victim selection
    policy: P,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: NonZeroUsize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Storage grows on demand. Use [`from_config`](Self::from_config) to
    /// reserve it up front.
    ///
    /// # Errors
    /// - [`ConfigError::ZeroCapacity`] when `capacity` is 0
    /// - [`ConfigError::CapacityTooLarge`] above [`MAX_CAPACITY`](crate::config::MAX_CAPACITY)
    pub fn new(capacity: usize) -> Result<Self> {
        Self::from_config(&CacheConfig::new(capacity).with_preallocate(false))
    }

    /// Creates a cache from an already validated capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::with_policy(capacity, LruPolicy)
    }

    /// Creates a cache from a [`CacheConfig`].
    ///
    /// # Errors
    /// As [`new`](Self::new), plus [`ConfigError::AllocationFailed`] when
    /// `preallocate` is set and the storage cannot be reserved.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::from_config_with_policy(config, LruPolicy)
    }
}

impl<K, V, M, P> LruCache<K, V, M, P>
where
    K: Hash + Eq + Clone,
    P: EvictionPolicy<Entry<K, V, M>>,
{
    /// Creates a cache that asks `policy` which entry to evict.
    pub fn with_policy(capacity: NonZeroUsize, policy: P) -> Self {
        Self::assemble(capacity, KeyIndex::new(), OrderedIndex::new(), policy)
    }

    /// Creates a cache from a [`CacheConfig`] with a custom policy.
    pub fn from_config_with_policy(config: &CacheConfig, policy: P) -> Result<Self> {
        let capacity = config.validate()?;
        if !config.preallocate {
            return Ok(Self::with_policy(capacity, policy));
        }

        // One slot past capacity: inserts link before they evict.
        let reserve = capacity.get() + 1;
        let failed = ConfigError::AllocationFailed {
            requested: capacity.get(),
        };
        let index = KeyIndex::try_with_capacity(reserve).map_err(|_| failed)?;
        let order = OrderedIndex::try_with_capacity(reserve).map_err(|_| failed)?;
        Ok(Self::assemble(capacity, index, order, policy))
    }

    fn assemble(
        capacity: NonZeroUsize,
        index: KeyIndex<K>,
        order: OrderedIndex<Entry<K, V, M>>,
        policy: P,
    ) -> Self {
        debug!("LRU cache created with capacity {}", capacity);
        Self {
            index,
            order,
            policy,
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A missing key is a normal outcome and yields `None`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.lookup_recording(key)?;
        self.touch(handle);
        Some(&self.order.get(handle).value)
    }

    /// Like [`get`](Self::get) but returns a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.lookup_recording(key)?;
        self.touch(handle);
        Some(&mut self.order.get_mut(handle).value)
    }

    /// Returns the value for `key` without changing recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .lookup(key)
            .map(|handle| &self.order.get(handle).value)
    }

    /// Returns true if `key` is cached. Recency is unchanged.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.lookup(key).is_some()
    }

    // == Put ==
    /// Stores a key/value pair and marks it most recently used.
    ///
    /// An existing key keeps its slot and metadata; the replaced value is
    /// returned. A new key gets default metadata, and if the cache was full
    /// the victim chosen by the policy is dropped.
    pub fn put(&mut self, key: K, value: V) -> Option<V>
    where
        M: Default,
    {
        if let Some(handle) = self.index.lookup(&key) {
            let old = self.order.get_mut(handle).replace_value(value);
            self.refresh(handle);
            return Some(old);
        }
        self.insert_new(key, value, M::default());
        None
    }

    /// Stores a key/value pair along with its metadata.
    ///
    /// On update both the value and the metadata are replaced.
    pub fn put_with_meta(&mut self, key: K, value: V, meta: M) -> Option<V> {
        if let Some(handle) = self.index.lookup(&key) {
            let entry = self.order.get_mut(handle);
            entry.meta = meta;
            let old = entry.replace_value(value);
            self.refresh(handle);
            return Some(old);
        }
        self.insert_new(key, value, meta);
        None
    }

    /// Stores a key/value pair and returns whatever left the cache.
    ///
    /// That is the previous pair when `key` was already cached, the evicted
    /// pair when the insert overflowed capacity, and `None` otherwise.
    pub fn push(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        M: Default,
    {
        if let Some(handle) = self.index.lookup(&key) {
            let old = self.order.get_mut(handle).replace_value(value);
            self.refresh(handle);
            return Some((key, old));
        }
        self.insert_new(key, value, M::default())
            .map(Entry::into_pair)
    }

    // == Remove ==
    /// Removes `key` and returns its value, or `None` if it was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.lookup(key)?;
        let entry = self.detach(handle);
        self.stats.record_removal();
        Some(entry.value)
    }

    /// Returns the least recently used pair without touching it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.order.peek_back().map(|handle| {
            let entry = self.order.get(handle);
            (entry.key(), &entry.value)
        })
    }

    /// Removes and returns the least recently used pair.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let handle = self.order.peek_back()?;
        let entry = self.detach(handle);
        self.stats.record_removal();
        Some(entry.into_pair())
    }

    // == Metadata ==
    /// Metadata attached to `key`. Recency is unchanged.
    pub fn meta<Q>(&self, key: &Q) -> Option<&M>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .lookup(key)
            .map(|handle| &self.order.get(handle).meta)
    }

    /// Mutable metadata attached to `key`. Recency is unchanged.
    pub fn meta_mut<Q>(&mut self, key: &Q) -> Option<&mut M>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.lookup(key)?;
        Some(&mut self.order.get_mut(handle).meta)
    }

    // == Clear ==
    /// Drops every entry. Capacity and statistics are kept.
    pub fn clear(&mut self) {
        let dropped = self.order.len();
        self.order.clear();
        self.index.clear();
        self.policy.on_clear();
        debug!("LRU cache cleared: dropped {} entries", dropped);
    }

    fn lookup_recording<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.lookup(key) {
            Some(handle) => {
                self.stats.record_hit();
                trace!("cache hit at slot {}", handle.slot());
                Some(handle)
            }
            None => {
                self.stats.record_miss();
                trace!("cache miss");
                None
            }
        }
    }

    fn touch(&mut self, handle: Handle) {
        self.order.move_to_front(handle);
        self.policy.on_access(handle);
    }

    fn refresh(&mut self, handle: Handle) {
        self.touch(handle);
        self.stats.record_update();
    }

    fn insert_new(&mut self, key: K, value: V, meta: M) -> Option<Entry<K, V, M>> {
        let handle = self.order.push_front(Entry::new(key.clone(), value, meta));
        self.index.insert(key, handle);
        self.policy.on_insert(handle);
        self.stats.record_insertion();

        // Growth is one entry at a time, so at most one eviction is needed.
        if self.order.len() > self.capacity.get() {
            self.evict()
        } else {
            None
        }
    }

    fn evict(&mut self) -> Option<Entry<K, V, M>> {
        let victim = self
            .policy
            .select_victim(&self.order)
            .or_else(|| self.order.peek_back())?;
        let entry = self.detach(victim);
        self.stats.record_eviction();
        debug!(
            "Evicted entry at slot {} (total evictions: {})",
            victim.slot(),
            self.stats.evictions
        );
        Some(entry)
    }

    fn detach(&mut self, handle: Handle) -> Entry<K, V, M> {
        self.policy.on_remove(handle);
        let entry = self.order.unlink(handle);
        let indexed = self.index.delete(entry.key());
        debug_assert_eq!(indexed, Some(handle), "key index out of sync");
        entry
    }

    /// Checks that both indices describe the same set of entries.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.order.assert_consistent();
        assert_eq!(self.index.len(), self.order.len());
        assert!(self.order.len() <= self.capacity.get());
        for (handle, entry) in self.order.iter() {
            assert_eq!(self.index.lookup(entry.key()), Some(handle));
        }
    }
}

impl<K, V, M, P> LruCache<K, V, M, P> {
    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.order.len());
        stats
    }

    /// Zeroes every counter.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::new();
    }

    /// The active eviction policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Iterates over pairs from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V, M> {
        Iter {
            inner: self.order.iter(),
        }
    }

    /// Iterates over keys from most to least recently used.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<K, V, M, P> fmt::Debug for LruCache<K, V, M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.order.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'a, K, V, M, P> IntoIterator for &'a LruCache<K, V, M, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Iterator ==
/// Iterator over `(&K, &V)` from most to least recently used.
pub struct Iter<'a, K, V, M> {
    inner: list::Iter<'a, Entry<K, V, M>>,
}

impl<'a, K, V, M> Iterator for Iter<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(_, entry)| (entry.key(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, M> DoubleEndedIterator for Iter<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|(_, entry)| (entry.key(), &entry.value))
    }
}

impl<K, V, M> ExactSizeIterator for Iter<'_, K, V, M> {}

impl<K, V, M> FusedIterator for Iter<'_, K, V, M> {}
