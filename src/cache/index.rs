//! Key Index Module
//!
//! Hash map from key to the handle of its node in the recency list.

use std::borrow::Borrow;
use std::collections::{HashMap, TryReserveError};
use std::hash::Hash;

use crate::cache::Handle;

// == Key Index ==
/// Non-owning key → [`Handle`] lookup table.
///
/// Entries own their keys; the index keeps a clone so lookups can borrow
/// the key type the way `HashMap` does.
#[derive(Debug, Clone)]
pub struct KeyIndex<K> {
    handles: HashMap<K, Handle>,
}

impl<K: Hash + Eq> KeyIndex<K> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Creates an empty index with room for `capacity` keys.
    ///
    /// # Errors
    /// Returns the allocator's error if the table cannot be reserved.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut handles = HashMap::new();
        handles.try_reserve(capacity)?;
        Ok(Self { handles })
    }

    // == Lookup ==
    /// Returns the handle stored for `key`, if any.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.handles.get(key).copied()
    }

    // == Insert ==
    /// Records the handle for a key that is not yet indexed.
    ///
    /// Inserting a key twice is a caller bug and trips a debug assertion.
    pub fn insert(&mut self, key: K, handle: Handle) {
        let previous = self.handles.insert(key, handle);
        debug_assert!(previous.is_none(), "key was already indexed");
    }

    // == Delete ==
    /// Removes the key and returns its handle, if it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.handles.remove(key)
    }

    // == Length ==
    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no key is indexed.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    // == Clear ==
    /// Forgets every key.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl<K: Hash + Eq> Default for KeyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
