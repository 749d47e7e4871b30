//! Storage seam for usage counters.
//!
//! [`UsageStore`] is what the tracker talks to; [`SqliteUsageStore`] is the
//! production implementation over the aq-db pool.

use aq_core::{Result, UserId};
use aq_db::pool::{get_conn, DbPool};
use aq_db::queries::feature_usage;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Count for one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub count: i64,
}

/// Count for one feature on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCount {
    pub feature: String,
    pub count: i64,
}

/// Persistent per-(user, feature, date) counters.
pub trait UsageStore: Send + Sync {
    /// Count on `date`, 0 when there is no record.
    fn usage_on(&self, user_id: UserId, feature: &str, date: NaiveDate) -> Result<i64>;

    /// Atomically create-or-increment the record for `date` and return the new count.
    fn increment(
        &self,
        user_id: UserId,
        feature: &str,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<i64>;

    /// Records with `since <= date <= until`, newest first.
    fn history(
        &self,
        user_id: UserId,
        feature: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyUsage>>;

    /// Every feature the user has a record for on `date`.
    fn usage_for_day(&self, user_id: UserId, date: NaiveDate) -> Result<Vec<FeatureCount>>;

    /// Delete records for `date`, for one feature or all. Returns rows removed.
    fn reset(&self, user_id: UserId, feature: Option<&str>, date: NaiveDate) -> Result<usize>;
}

/// [`UsageStore`] backed by the SQLite `feature_usage` table.
#[derive(Clone)]
pub struct SqliteUsageStore {
    pool: DbPool,
}

impl SqliteUsageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UsageStore for SqliteUsageStore {
    fn usage_on(&self, user_id: UserId, feature: &str, date: NaiveDate) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        feature_usage::usage_count(&conn, user_id, feature, date)
    }

    fn increment(
        &self,
        user_id: UserId,
        feature: &str,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        feature_usage::increment_usage(&conn, user_id, feature, date, at)
    }

    fn history(
        &self,
        user_id: UserId,
        feature: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyUsage>> {
        let conn = get_conn(&self.pool)?;
        let rows = feature_usage::list_usage_between(&conn, user_id, feature, since, until)?;
        Ok(rows
            .into_iter()
            .map(|r| DailyUsage {
                date: r.usage_date,
                count: r.usage_count,
            })
            .collect())
    }

    fn usage_for_day(&self, user_id: UserId, date: NaiveDate) -> Result<Vec<FeatureCount>> {
        let conn = get_conn(&self.pool)?;
        let rows = feature_usage::list_usage_on(&conn, user_id, date)?;
        Ok(rows
            .into_iter()
            .map(|r| FeatureCount {
                feature: r.feature_name,
                count: r.usage_count,
            })
            .collect())
    }

    fn reset(&self, user_id: UserId, feature: Option<&str>, date: NaiveDate) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        feature_usage::delete_usage(&conn, user_id, feature, date)
    }
}
