#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use zonecache::{Location, ResolveError, Resolver, TzdbResolver};

/// Test utilities for integration testing
pub mod test_utils {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    /// Midwinter instant, standard time in the northern hemisphere
    pub fn winter() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    /// Midsummer instant, DST in the northern hemisphere
    pub fn summer() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    /// Every identifier of the embedded database
    pub fn all_zone_names() -> Vec<&'static str> {
        let names: Vec<_> = TzdbResolver::available_names().collect();
        assert!(!names.is_empty(), "empty location names list");
        names
    }
}

/// Resolver that only knows "Europe/Kyiv" and counts every call
#[derive(Debug, Default)]
pub struct KyivOnlyResolver {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl KyivOnlyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every call, widening race windows
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolver for KyivOnlyResolver {
    type Location = Location;
    type Error = ResolveError;

    fn resolve(&self, name: &str) -> Result<Location, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match name {
            "Europe/Kyiv" => Ok(Location::new(name, chrono_tz::Europe::Kyiv)),
            _ => Err(ResolveError::unknown_zone(name)),
        }
    }
}

/// Wraps another resolver and counts calls to it
#[derive(Debug, Default)]
pub struct CountingResolver<R> {
    inner: R,
    calls: AtomicUsize,
}

impl<R> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: Resolver> Resolver for CountingResolver<R> {
    type Location = R::Location;
    type Error = R::Error;

    fn resolve(&self, name: &str) -> Result<R::Location, R::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(name)
    }
}

/// Custom assertions for cached lookups
pub mod assertions {
    use super::*;

    /// Assert that a cached outcome matches calling the resolver directly
    pub fn assert_equivalent(
        name: &str,
        raw: &Result<Location, ResolveError>,
        cached: &Result<std::sync::Arc<Location>, ResolveError>,
    ) {
        match (raw, cached) {
            (Ok(raw), Ok(cached)) => assert_eq!(raw, &**cached, "location mismatch for {name:?}"),
            (Err(raw), Err(cached)) => assert_eq!(raw, cached, "error mismatch for {name:?}"),
            (raw, cached) => panic!("outcome mismatch for {name:?}: raw {raw:?}, cached {cached:?}"),
        }
    }
}
