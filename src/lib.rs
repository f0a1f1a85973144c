//! LRU Engine - A bounded-capacity least-recently-used cache
//!
//! Provides a key/value store that evicts the least recently used entry
//! once full, with O(1) average `get`, `put` and `remove`.
//!
//! ```
//! use lru_engine::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! cache.put(3, "c");
//!
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some(&"a"));
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, Entry, EvictionPolicy, Handle, LruCache, LruPolicy, OrderedIndex};
pub use config::CacheConfig;
pub use error::{ConfigError, Result};
