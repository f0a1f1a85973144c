//! Cache Entry Module
//!
//! Defines the owned key/value pair stored in each arena slot.

// == Entry ==
/// A single cached key/value pair plus caller-owned metadata.
///
/// The key is fixed for the lifetime of the entry. The value and metadata
/// may be replaced in place. Recency links live on the arena slot holding
/// the entry, not on the entry itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V, M = ()> {
    key: K,
    /// The stored value
    pub value: V,
    /// Opaque per-entry data, never read by the cache
    pub meta: M,
}

impl<K, V, M> Entry<K, V, M> {
    // == Constructor ==
    /// Creates a new entry.
    pub fn new(key: K, value: V, meta: M) -> Self {
        Self { key, value, meta }
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    // == Replace ==
    /// Swaps in a new value and returns the previous one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into its parts.
    pub fn into_parts(self) -> (K, V, M) {
        (self.key, self.value, self.meta)
    }

    /// Drops the metadata and returns the key/value pair.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
