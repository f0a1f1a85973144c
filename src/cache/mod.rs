//! Cache Module
//!
//! Bounded LRU cache built from an arena-backed recency list and a hash
//! index of handles into it.

mod entry;
mod index;
mod list;
mod lru;
mod policy;
mod stats;


// Re-export public types
pub use entry::Entry;
pub use index::KeyIndex;
pub use list::{Handle, Iter as OrderIter, OrderedIndex};
pub use lru::{Iter, LruCache};
pub use policy::{EvictionPolicy, LruPolicy};
pub use stats::CacheStats;
