//! Reference-date computation.
//!
//! Quotas reset at midnight in a fixed reference timezone, independent of the
//! host's local zone and of the database clock. Whether real timezone data is
//! available is decided once, when the [`ReferenceZone`] is resolved.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// The timezone whose calendar day bounds a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceZone {
    /// A real IANA zone with DST rules.
    Named(Tz),
    /// Timezone data was unavailable; dates are UTC dates.
    UtcFallback,
}

impl ReferenceZone {
    /// Resolve a zone by IANA name.
    ///
    /// An unknown name degrades to [`ReferenceZone::UtcFallback`] with a
    /// warning rather than failing: a missing zone must not block play, even
    /// though the reset boundary then shifts by several hours.
    pub fn resolve(name: &str) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => ReferenceZone::Named(tz),
            Err(e) => {
                tracing::warn!(
                    timezone = name,
                    "Timezone data unavailable ({e}); usage dates fall back to UTC"
                );
                ReferenceZone::UtcFallback
            }
        }
    }

    /// Calendar date of `instant` in this zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            ReferenceZone::Named(tz) => instant.with_timezone(tz).date_naive(),
            ReferenceZone::UtcFallback => instant.date_naive(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReferenceZone::UtcFallback)
    }

    /// Display name of the zone.
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceZone::Named(tz) => tz.name(),
            ReferenceZone::UtcFallback => "UTC",
        }
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        ReferenceZone::Named(chrono_tz::America::New_York)
    }
}

/// A clock paired with the zone it is read in.
#[derive(Clone)]
pub struct ReferenceClock {
    clock: Arc<dyn Clock>,
    zone: ReferenceZone,
}

impl ReferenceClock {
    pub fn new(clock: Arc<dyn Clock>, zone: ReferenceZone) -> Self {
        Self { clock, zone }
    }

    /// Wall clock read in the given zone.
    pub fn system(zone: ReferenceZone) -> Self {
        Self::new(Arc::new(SystemClock), zone)
    }

    /// Today's reference date.
    pub fn today(&self) -> NaiveDate {
        self.zone.date_of(self.clock.now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }
}

impl std::fmt::Debug for ReferenceClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceClock")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}
