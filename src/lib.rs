//! # zonecache
//!
//! Read-through memoization for time-zone lookups. Resolving an identifier such
//! as `"Europe/Kyiv"` into a [`Location`] is done once per name; every later
//! lookup returns the same shared `Arc<Location>`.
//!
//! ```
//! let kyiv = zonecache::load_location("Europe/Kyiv").unwrap();
//! assert_eq!(kyiv.name(), "Europe/Kyiv");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod metrics;
pub mod resolver;

// Re-export commonly used types
pub use cache::{
    LocationCache, PreloadReport, default_cache, initialize_default_cache_with_config,
    load_location,
};
pub use config::CacheConfig;
pub use error::{ConfigError, FailureReason, ResolveError};
pub use location::Location;
pub use metrics::CacheStats;
pub use resolver::{Resolver, TzdbResolver};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
