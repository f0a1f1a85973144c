//! Configuration Module
//!
//! Construction parameters for an [`LruCache`](crate::LruCache).

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Largest capacity the arena can index: one overflow slot plus the two
/// sentinels must still fit in `usize`.
pub const MAX_CAPACITY: usize = usize::MAX - 3;

/// Default number of entries when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache construction parameters.
///
/// Deserializable so a host application can embed it in its own
/// configuration file. Missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Reserve storage for `capacity` entries up front
    pub preallocate: bool,
}

impl CacheConfig {
    /// Creates a config with the given capacity and preallocation enabled.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Sets whether storage is reserved at construction.
    pub fn with_preallocate(mut self, preallocate: bool) -> Self {
        self.preallocate = preallocate;
        self
    }

    // == Validate ==
    /// Checks the capacity and returns it as a non-zero value.
    ///
    /// # Errors
    /// - [`ConfigError::ZeroCapacity`] if `capacity == 0`
    /// - [`ConfigError::CapacityTooLarge`] if `capacity > MAX_CAPACITY`
    pub fn validate(&self) -> Result<NonZeroUsize> {
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        NonZeroUsize::new(self.capacity).ok_or(ConfigError::ZeroCapacity)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            preallocate: true,
        }
    }
}
