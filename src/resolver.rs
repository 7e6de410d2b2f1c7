//! Name-to-location resolvers
//!
//! A [`Resolver`] is the expensive, deterministic lookup that sits behind a
//! [`LocationCache`](crate::LocationCache). The cache treats both its output
//! and its error as opaque values.

use chrono_tz::{TZ_VARIANTS, Tz};
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::location::Location;

/// A function from identifier to resolved value.
///
/// Implementations must be safe to call from many threads at once and must
/// return equivalent results for the same name for the lifetime of the
/// process (transient failures aside).
pub trait Resolver: Send + Sync {
    type Location: Send + Sync;
    type Error;

    fn resolve(&self, name: &str) -> Result<Self::Location, Self::Error>;
}

impl<F, L, E> Resolver for F
where
    F: Fn(&str) -> Result<L, E> + Send + Sync,
    L: Send + Sync,
{
    type Location = L;
    type Error = E;

    fn resolve(&self, name: &str) -> Result<L, E> {
        self(name)
    }
}

/// Resolves names against the IANA database embedded through `chrono-tz`
#[derive(Debug, Clone, Copy, Default)]
pub struct TzdbResolver;

impl TzdbResolver {
    pub fn new() -> Self {
        Self
    }

    /// Every identifier the embedded database knows about
    pub fn available_names() -> impl Iterator<Item = &'static str> {
        TZ_VARIANTS.iter().map(|tz| tz.name())
    }

    fn local() -> Location {
        let tz = std::env::var_os("TZ");
        Self::local_with_tz(tz.as_ref().map(|v| v.to_string_lossy()).as_deref())
    }

    /// Rules for `"Local"` given the value of `$TZ`.
    ///
    /// Unset means the host setting. Empty, `UTC` or an unknown zone means UTC.
    /// A leading `:` is ignored, and an absolute path under a `zoneinfo/`
    /// directory is reduced to the zone name after it.
    fn local_with_tz(tz: Option<&str>) -> Location {
        let Some(tz) = tz else {
            return Self::system_local();
        };

        let tz = tz.strip_prefix(':').unwrap_or(tz);
        let name = match tz.rfind("zoneinfo/") {
            Some(idx) if tz.starts_with('/') => &tz[idx + "zoneinfo/".len()..],
            _ => tz,
        };

        if !name.is_empty() && name != "UTC" {
            match name.parse::<Tz>() {
                Ok(rules) => return Location::new("Local", rules),
                Err(e) => warn!("TZ={:?} not recognised, using UTC: {}", tz, e),
            }
        }
        Location::new("Local", Tz::UTC)
    }

    fn system_local() -> Location {
        match iana_time_zone::get_timezone() {
            Ok(system) => match system.parse::<Tz>() {
                Ok(tz) => return Location::new("Local", tz),
                Err(e) => warn!("System time zone {} not recognised: {}", system, e),
            },
            Err(e) => warn!("Unable to detect system time zone: {}", e),
        }
        Location::new("Local", Tz::UTC)
    }
}

impl Resolver for TzdbResolver {
    type Location = Location;
    type Error = ResolveError;

    fn resolve(&self, name: &str) -> Result<Location, ResolveError> {
        debug!("Resolving time zone {:?}", name);

        match name {
            "" | "UTC" => return Ok(Location::utc()),
            "Local" => return Ok(Self::local()),
            _ => {}
        }

        if name.contains("..") || name.starts_with('/') || name.starts_with('\\') {
            return Err(ResolveError::invalid_name(name));
        }

        name.parse::<Tz>()
            .map(|tz| Location::new(name, tz))
            .map_err(|_| ResolveError::unknown_zone(name))
    }
}
