//! Error types for the cache engine
//!
//! Construction is the only fallible operation. Lookups that find nothing
//! return `None` rather than an error.

use thiserror::Error;

// == Config Error Enum ==
/// Reasons a cache cannot be built from the requested configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity of zero was requested
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,

    /// Capacity does not leave room for the arena's bookkeeping slots
    #[error("cache capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge { requested: usize, max: usize },

    /// Preallocating storage for the requested capacity failed
    #[error("could not preallocate storage for {requested} entries")]
    AllocationFailed { requested: usize },
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, ConfigError>;
