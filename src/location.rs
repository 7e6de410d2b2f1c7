//! Resolved time-zone values
//!
//! A [`Location`] is produced once per identifier by a resolver and then shared
//! by reference (`Arc<Location>`) with every caller of the cache. It is never
//! mutated after construction.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use std::fmt;

/// A fully resolved time zone: the identifier it was requested by plus its rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    name: String,
    tz: Tz,
}

impl Location {
    pub fn new(name: impl Into<String>, tz: Tz) -> Self {
        Self {
            name: name.into(),
            tz,
        }
    }

    /// The UTC location
    pub fn utc() -> Self {
        Self::new("UTC", Tz::UTC)
    }

    /// The identifier this location was resolved for.
    ///
    /// This is the requested name, not necessarily the canonical IANA name:
    /// `"Local"` stays `"Local"` even though its rules come from the host zone.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Total UTC offset (standard + DST) in effect at `instant`
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        self.tz.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }

    /// Zone abbreviation in effect at `instant`, e.g. "EET" or "EEST"
    pub fn abbreviation_at(&self, instant: DateTime<Utc>) -> String {
        self.to_local(instant).format("%Z").to_string()
    }

    pub fn is_dst_at(&self, instant: DateTime<Utc>) -> bool {
        let offset = self.tz.offset_from_utc_datetime(&instant.naive_utc());
        !offset.dst_offset().is_zero()
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
