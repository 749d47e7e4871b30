//! Daily feature-usage quota tracker.
//!
//! Every storage failure is absorbed here. Reads report zero, gate checks
//! allow, writes report `false`; nothing is propagated to the caller. A
//! tracking outage must never block play.

use std::sync::Arc;

use aq_core::config::UNLIMITED_DAILY_LIMIT;
use aq_core::UserId;
use aq_db::pool::DbPool;
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::clock::{ReferenceClock, ReferenceZone};
use crate::store::{DailyUsage, FeatureCount, SqliteUsageStore, UsageStore};

/// History window for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub feature: String,
    pub days: u32,
    /// Days with at least one use, newest first.
    pub daily: Vec<DailyUsage>,
    pub total: i64,
}

/// Everything a caller needs to allow or deny one use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStatus {
    pub feature: String,
    pub reference_date: NaiveDate,
    pub used_today: i64,
    pub daily_limit: i64,
    /// `None` when the limit is the unlimited sentinel.
    pub remaining: Option<i64>,
    pub can_use: bool,
}

/// Whether a limit means "no limit".
pub fn is_unlimited(daily_limit: i64) -> bool {
    daily_limit >= UNLIMITED_DAILY_LIMIT
}

/// Per-user, per-feature, per-reference-day usage counter.
#[derive(Clone)]
pub struct UsageTracker {
    store: Arc<dyn UsageStore>,
    clock: ReferenceClock,
}

impl UsageTracker {
    pub fn new(store: Arc<dyn UsageStore>, clock: ReferenceClock) -> Self {
        Self { store, clock }
    }

    /// Tracker over the SQLite pool, reading the wall clock in `zone`.
    pub fn with_pool(pool: DbPool, zone: ReferenceZone) -> Self {
        Self::new(
            Arc::new(SqliteUsageStore::new(pool)),
            ReferenceClock::system(zone),
        )
    }

    pub fn clock(&self) -> &ReferenceClock {
        &self.clock
    }

    /// Today in the reference timezone.
    pub fn current_reference_date(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Today's count for a feature, 0 if unused or if storage fails.
    pub fn usage_today(&self, user_id: UserId, feature: &str) -> i64 {
        let today = self.current_reference_date();
        match self.store.usage_on(user_id, feature, today) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(%user_id, feature, error = %e, "Usage lookup failed; reporting zero");
                0
            }
        }
    }

    /// Whether the user may use the feature again today.
    ///
    /// Unlimited limits never touch storage. Storage failures allow.
    pub fn can_use(&self, user_id: UserId, feature: &str, daily_limit: i64) -> bool {
        if is_unlimited(daily_limit) {
            return true;
        }
        let today = self.current_reference_date();
        match self.store.usage_on(user_id, feature, today) {
            Ok(count) => count < daily_limit,
            Err(e) => {
                tracing::warn!(%user_id, feature, error = %e, "Usage check failed; allowing");
                true
            }
        }
    }

    /// Count one use of the feature today.
    ///
    /// Does not look at any limit; gating is the caller's job. Returns
    /// `false` if the use could not be stored.
    pub fn record_usage(&self, user_id: UserId, feature: &str) -> bool {
        let now = self.clock.now();
        let today = self.clock.zone().date_of(now);
        match self.store.increment(user_id, feature, today, now) {
            Ok(count) => {
                tracing::debug!(%user_id, feature, %today, count, "Recorded feature use");
                true
            }
            Err(e) => {
                tracing::warn!(%user_id, feature, error = %e, "Failed to record feature use");
                false
            }
        }
    }

    /// The last `days` reference days of history for a feature, today
    /// included, plus their total.
    pub fn usage_stats(&self, user_id: UserId, feature: &str, days: u32) -> UsageStats {
        let mut stats = UsageStats {
            feature: feature.to_string(),
            days,
            daily: Vec::new(),
            total: 0,
        };
        if days == 0 {
            return stats;
        }

        let today = self.current_reference_date();
        // Windows reaching past the calendar's start cover all history.
        let since = today
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);
        match self.store.history(user_id, feature, since, today) {
            Ok(daily) => {
                stats.total = daily.iter().map(|d| d.count).sum();
                stats.daily = daily;
            }
            Err(e) => {
                tracing::warn!(%user_id, feature, error = %e, "Usage history unavailable");
            }
        }
        stats
    }

    /// Delete today's record for one feature, or for every feature when
    /// `feature` is `None`. Past days are kept. Returns `false` on failure.
    pub fn reset_usage(&self, user_id: UserId, feature: Option<&str>) -> bool {
        let today = self.current_reference_date();
        match self.store.reset(user_id, feature, today) {
            Ok(removed) => {
                tracing::info!(
                    %user_id,
                    feature = feature.unwrap_or("*"),
                    %today,
                    removed,
                    "Reset today's usage"
                );
                true
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to reset usage");
                false
            }
        }
    }

    /// Current standing of a feature against `daily_limit`.
    ///
    /// One clock read and one storage read, so `remaining` and `can_use`
    /// always describe the same count. Fails open like [`Self::can_use`].
    pub fn status(&self, user_id: UserId, feature: &str, daily_limit: i64) -> UsageStatus {
        let today = self.current_reference_date();
        let unlimited = is_unlimited(daily_limit);
        let (used_today, can_use) = match self.store.usage_on(user_id, feature, today) {
            Ok(count) => (count, unlimited || count < daily_limit),
            Err(e) => {
                tracing::warn!(%user_id, feature, error = %e, "Usage status unavailable; allowing");
                (0, true)
            }
        };
        UsageStatus {
            feature: feature.to_string(),
            reference_date: today,
            used_today,
            daily_limit,
            remaining: (!unlimited).then(|| daily_limit.saturating_sub(used_today).max(0)),
            can_use,
        }
    }

    /// Every feature the user has touched today. Empty on failure.
    pub fn usage_summary(&self, user_id: UserId) -> Vec<FeatureCount> {
        let today = self.current_reference_date();
        self.store.usage_for_day(user_id, today).unwrap_or_else(|e| {
            tracing::warn!(%user_id, error = %e, "Usage summary unavailable");
            Vec::new()
        })
    }
}

impl std::fmt::Debug for UsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageTracker")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
