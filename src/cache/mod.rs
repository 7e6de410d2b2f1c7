//! Read-through location cache
//!
//! [`LocationCache`] memoizes a [`Resolver`] behind a reader/writer lock.
//! Hits only take the shared lock, so concurrent lookups of cached names never
//! contend with each other. A miss takes the exclusive lock, re-checks the
//! store, and only then calls the resolver. Several callers racing on the same
//! cold name may each call the resolver, but the first one to get the write
//! lock commits its value and every later caller gets that same `Arc`.
//!
//! Failed resolutions are never stored; the next lookup of that name calls
//! the resolver again. The store only grows and lives as long as the cache.

use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc, sync::OnceLock};
use tracing::{debug, info, trace, warn};

use crate::config::CacheConfig;
use crate::error::{ConfigError, ResolveError};
use crate::location::Location;
use crate::metrics::{CacheCounters, CacheStats};
use crate::resolver::{Resolver, TzdbResolver};

/// Memoizing front for a [`Resolver`]
pub struct LocationCache<R: Resolver> {
    resolver: R,
    locations: RwLock<HashMap<String, Arc<R::Location>>>,
    counters: CacheCounters,
}

/// Outcome of [`LocationCache::preload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    /// Names that failed, with the resolver's message
    pub failed: Vec<(String, String)>,
}

impl<R: Resolver> LocationCache<R> {
    /// Create an empty cache with default settings
    pub fn new(resolver: R) -> Self {
        Self::empty(resolver, &CacheConfig::default())
    }

    /// Create a cache and eagerly resolve `config.preload`.
    ///
    /// Names that fail to resolve are skipped and left uncached.
    pub fn with_config(resolver: R, config: CacheConfig) -> Self {
        let cache = Self::empty(resolver, &config);

        let mut failed = 0;
        for name in &config.preload {
            if cache.load_location(name).is_err() {
                warn!("Failed to preload location {:?}", name);
                failed += 1;
            }
        }
        if !config.preload.is_empty() {
            info!(
                "Preloaded {} locations ({} failed)",
                config.preload.len() - failed,
                failed
            );
        }
        cache
    }

    fn empty(resolver: R, config: &CacheConfig) -> Self {
        Self {
            resolver,
            locations: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            counters: CacheCounters::new(config.collect_stats),
        }
    }

    /// Return the location for `name`, resolving and storing it on first use.
    ///
    /// The resolver's error is returned unchanged and nothing is stored for
    /// that name.
    pub fn load_location(&self, name: &str) -> Result<Arc<R::Location>, R::Error> {
        let cached = self.locations.read().get(name).cloned();
        if let Some(location) = cached {
            trace!("Location cache hit for {:?}", name);
            self.counters.record_hit();
            return Ok(location);
        }

        let mut locations = self.locations.write();

        // Another caller may have committed this name while we waited
        if let Some(location) = locations.get(name) {
            trace!("Location {:?} populated while waiting for write lock", name);
            self.counters.record_hit();
            return Ok(Arc::clone(location));
        }

        self.counters.record_miss();
        debug!("Location cache miss for {:?}, calling resolver", name);

        match self.resolver.resolve(name) {
            Ok(location) => {
                let location = Arc::new(location);
                locations.insert(name.to_owned(), Arc::clone(&location));
                self.counters.record_resolution(true);
                debug!("Cached location {:?} ({} entries)", name, locations.len());
                Ok(location)
            }
            Err(e) => {
                self.counters.record_resolution(false);
                debug!("Resolver failed for {:?}; not caching", name);
                Err(e)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<R> LocationCache<R>
where
    R: Resolver,
    R::Error: fmt::Display,
{
    /// Resolve every name in `names`, recording which ones failed.
    ///
    /// Names that fail are not cached, exactly as with [`load_location`](Self::load_location).
    pub fn preload<I, S>(&self, names: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = PreloadReport::default();

        for name in names {
            let name = name.as_ref();
            match self.load_location(name) {
                Ok(_) => report.loaded += 1,
                Err(e) => {
                    warn!("Failed to preload location {:?}: {}", name, e);
                    report.failed.push((name.to_owned(), e.to_string()));
                }
            }
        }

        info!(
            "Preloaded {} locations ({} failed)",
            report.loaded,
            report.failed.len()
        );
        report
    }
}

impl<R: Resolver + Default> Default for LocationCache<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: Resolver + fmt::Debug> fmt::Debug for LocationCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationCache")
            .field("resolver", &self.resolver)
            .field("entries", &self.len())
            .finish()
    }
}

/// Process-wide cache backed by the embedded IANA database
static DEFAULT_CACHE: OnceLock<LocationCache<TzdbResolver>> = OnceLock::new();

/// Get the process-wide location cache, creating it with defaults on first use.
///
/// The instance lives for the rest of the process; there is no reset.
pub fn default_cache() -> &'static LocationCache<TzdbResolver> {
    DEFAULT_CACHE.get_or_init(|| {
        info!("Initializing default location cache");
        LocationCache::new(TzdbResolver)
    })
}

/// Install a configured process-wide cache.
///
/// Fails with [`ConfigError::AlreadyInitialized`] if the default cache was
/// already installed or already used.
pub fn initialize_default_cache_with_config(config: CacheConfig) -> Result<(), ConfigError> {
    let mut installed = false;

    DEFAULT_CACHE.get_or_init(|| {
        info!("Initializing default location cache with config: {:?}", config);
        installed = true;
        LocationCache::with_config(TzdbResolver, config)
    });

    if installed {
        Ok(())
    } else {
        Err(ConfigError::AlreadyInitialized)
    }
}

/// Look up `name` through the process-wide cache
pub fn load_location(name: &str) -> Result<Arc<Location>, ResolveError> {
    default_cache().load_location(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_resolver(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(&str) -> Result<String, String> + Send + Sync {
        move |name: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            if name.starts_with("Bad") {
                Err(format!("cannot resolve {name}"))
            } else {
                Ok(name.to_uppercase())
            }
        }
    }

    #[test]
    fn test_hit_skips_resolver() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LocationCache::new(counting_resolver(calls.clone()));

        let first = cache.load_location("Europe/Kyiv").unwrap();
        let second = cache.load_location("Europe/Kyiv").unwrap();

        assert_eq!(*first, "EUROPE/KYIV");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LocationCache::new(counting_resolver(calls.clone()));

        for i in 1..=3 {
            let err = cache.load_location("Bad/Zone").unwrap_err();
            assert_eq!(err, "cannot resolve Bad/Zone");
            assert_eq!(calls.load(Ordering::SeqCst), i);
        }
        assert!(!cache.contains("Bad/Zone"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LocationCache::new(counting_resolver(calls));

        cache.load_location("A").unwrap();
        cache.load_location("A").unwrap();
        cache.load_location("A").unwrap();
        let _ = cache.load_location("Bad");

        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 2,
                resolutions: 1,
                failures: 1,
                entries: 1,
            }
        );
    }

    #[test]
    fn test_stats_disabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = CacheConfig {
            collect_stats: false,
            ..CacheConfig::default()
        };
        let cache = LocationCache::with_config(counting_resolver(calls), config);

        cache.load_location("A").unwrap();
        cache.load_location("A").unwrap();

        assert_eq!(cache.stats(), CacheStats { entries: 1, ..Default::default() });
    }

    #[test]
    fn test_with_config_preloads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = CacheConfig {
            preload: vec!["A".to_string(), "Bad/Zone".to_string(), "B".to_string()],
            ..CacheConfig::default()
        };
        let cache = LocationCache::with_config(counting_resolver(calls.clone()), config);

        assert!(cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(!cache.contains("Bad/Zone"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cache.load_location("A").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[derive(Debug, PartialEq)]
    struct Opaque;

    #[test]
    fn test_with_config_without_displayable_error() {
        let config = CacheConfig {
            initial_capacity: 4,
            preload: vec!["A".to_string(), "Bad".to_string()],
            collect_stats: false,
        };
        let cache = LocationCache::with_config(
            |name: &str| -> Result<usize, Opaque> {
                if name == "Bad" { Err(Opaque) } else { Ok(name.len()) }
            },
            config,
        );

        assert!(cache.contains("A"));
        assert!(!cache.contains("Bad"));
        assert_eq!(cache.load_location("Bad").unwrap_err(), Opaque);
        assert_eq!(cache.stats(), CacheStats { entries: 1, ..Default::default() });
    }

    #[test]
    fn test_preload_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LocationCache::new(counting_resolver(calls));

        let report = cache.preload(["A", "Bad/One", "A"]);
        assert_eq!(report.loaded, 2);
        assert_eq!(
            report.failed,
            vec![("Bad/One".to_string(), "cannot resolve Bad/One".to_string())]
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LocationCache::new(counting_resolver(calls.clone()));

        let lower = cache.load_location("utc").unwrap();
        let upper = cache.load_location("UTC").unwrap();

        assert_eq!(lower, upper);
        assert!(!Arc::ptr_eq(&lower, &upper));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_default_cache_is_shared() {
        let cache1 = default_cache();
        let cache2 = default_cache();

        // Should be the same instance
        assert!(std::ptr::eq(cache1, cache2));

        let a = load_location("Europe/Kyiv").unwrap();
        let b = load_location("Europe/Kyiv").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache1.contains("Europe/Kyiv"));
    }

    #[test]
    fn test_default_cache_cannot_be_reinitialized() {
        default_cache();
        let result = initialize_default_cache_with_config(CacheConfig::default());
        assert!(matches!(result, Err(ConfigError::AlreadyInitialized)));
    }
}
