//! Eviction Policy Module
//!
//! Decides which entry leaves the cache when an insert overflows capacity.

use crate::cache::{Handle, OrderedIndex};

// == Eviction Policy ==
/// Strategy for choosing the eviction victim.
///
/// The cache calls the hooks as entries enter, are read or leave, so a
/// policy can keep its own per-handle bookkeeping. Whatever handle
/// `select_victim` returns is removed through [`OrderedIndex::unlink`].
pub trait EvictionPolicy<T> {
    /// Picks the node to evict from a non-empty list.
    ///
    /// Returning `None` leaves the cache over capacity by one; the cache
    /// falls back to the least recently used node in that case.
    fn select_victim(&self, order: &OrderedIndex<T>) -> Option<Handle>;

    /// A new node was pushed to the front.
    fn on_insert(&mut self, _handle: Handle) {}

    /// An existing node was read or overwritten and moved to the front.
    fn on_access(&mut self, _handle: Handle) {}

    /// A node is about to be unlinked, by eviction or explicit removal.
    fn on_remove(&mut self, _handle: Handle) {}

    /// Every node was dropped.
    fn on_clear(&mut self) {}
}

// == LRU Policy ==
/// Evicts the node just before the tail sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LruPolicy;

impl<T> EvictionPolicy<T> for LruPolicy {
    fn select_victim(&self, order: &OrderedIndex<T>) -> Option<Handle> {
        order.peek_back()
    }
}
