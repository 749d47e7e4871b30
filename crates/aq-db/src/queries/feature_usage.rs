//! Per-day feature usage counters.

use aq_core::{Error, Result, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{format_date, FeatureUsage};

const COLS: &str = "id, user_id, feature_name, usage_date, usage_count, last_used_at";

/// Create today's row with a count of 1, or bump an existing row by 1.
///
/// A single `INSERT … ON CONFLICT … DO UPDATE … RETURNING` statement, so two
/// callers racing on the same key can never lose an increment. Returns the
/// count after this call.
pub fn increment_usage(
    conn: &Connection,
    user_id: UserId,
    feature: &str,
    usage_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.query_row(
        "INSERT INTO feature_usage (user_id, feature_name, usage_date, usage_count, last_used_at)
         VALUES (?1, ?2, ?3, 1, ?4)
         ON CONFLICT(user_id, feature_name, usage_date) DO UPDATE SET
            usage_count = usage_count + 1,
            last_used_at = excluded.last_used_at
         RETURNING usage_count",
        rusqlite::params![user_id.get(), feature, format_date(usage_date), now.to_rfc3339()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Count for a (user, feature, date) triple; 0 when no row exists.
pub fn usage_count(
    conn: &Connection,
    user_id: UserId,
    feature: &str,
    usage_date: NaiveDate,
) -> Result<i64> {
    let count: Option<i64> = conn
        .query_row(
            "SELECT usage_count FROM feature_usage
             WHERE user_id = ?1 AND feature_name = ?2 AND usage_date = ?3",
            rusqlite::params![user_id.get(), feature, format_date(usage_date)],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(count.unwrap_or(0))
}

/// Rows for one feature with `since <= usage_date <= until`, newest first.
pub fn list_usage_between(
    conn: &Connection,
    user_id: UserId,
    feature: &str,
    since: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<FeatureUsage>> {
    let q = format!(
        "SELECT {COLS} FROM feature_usage
         WHERE user_id = ?1 AND feature_name = ?2 AND usage_date >= ?3 AND usage_date <= ?4
         ORDER BY usage_date DESC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![user_id.get(), feature, format_date(since), format_date(until)],
            FeatureUsage::from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Every feature row a user has on a given date, ordered by feature name.
pub fn list_usage_on(
    conn: &Connection,
    user_id: UserId,
    usage_date: NaiveDate,
) -> Result<Vec<FeatureUsage>> {
    let q = format!(
        "SELECT {COLS} FROM feature_usage
         WHERE user_id = ?1 AND usage_date = ?2
         ORDER BY feature_name ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![user_id.get(), format_date(usage_date)],
            FeatureUsage::from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Delete a user's rows for one date, either for one feature or for all of
/// them. Returns the number of rows removed.
pub fn delete_usage(
    conn: &Connection,
    user_id: UserId,
    feature: Option<&str>,
    usage_date: NaiveDate,
) -> Result<usize> {
    let date = format_date(usage_date);
    let n = match feature {
        Some(feature) => conn.execute(
            "DELETE FROM feature_usage
             WHERE user_id = ?1 AND feature_name = ?2 AND usage_date = ?3",
            rusqlite::params![user_id.get(), feature, date],
        ),
        None => conn.execute(
            "DELETE FROM feature_usage WHERE user_id = ?1 AND usage_date = ?2",
            rusqlite::params![user_id.get(), date],
        ),
    }
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap()
    }

    fn setup() -> r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager> {
        let pool = init_memory_pool().unwrap();
        pool.get().unwrap()
    }

    #[test]
    fn increment_creates_then_bumps() {
        let conn = setup();
        let uid = UserId::new(7);

        assert_eq!(increment_usage(&conn, uid, "riddle", day(1), at(1, 12)).unwrap(), 1);
        assert_eq!(increment_usage(&conn, uid, "riddle", day(1), at(1, 13)).unwrap(), 2);
        assert_eq!(increment_usage(&conn, uid, "riddle", day(1), at(1, 14)).unwrap(), 3);

        let rows = list_usage_on(&conn, uid, day(1)).unwrap();
        let row = &rows[0];
        assert_eq!(row.usage_count, 3);
        assert_eq!(row.last_used_at, at(1, 14).to_rfc3339());

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM feature_usage", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1, "one row per natural key");
    }

    #[test]
    fn keys_are_independent() {
        let conn = setup();
        increment_usage(&conn, UserId::new(1), "riddle", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, UserId::new(2), "riddle", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, UserId::new(1), "snake", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, UserId::new(1), "riddle", day(2), at(2, 12)).unwrap();

        assert_eq!(usage_count(&conn, UserId::new(1), "riddle", day(1)).unwrap(), 1);
        assert_eq!(usage_count(&conn, UserId::new(2), "riddle", day(1)).unwrap(), 1);
        assert_eq!(usage_count(&conn, UserId::new(1), "snake", day(1)).unwrap(), 1);
        assert_eq!(usage_count(&conn, UserId::new(1), "riddle", day(2)).unwrap(), 1);
    }

    #[test]
    fn missing_row_counts_zero() {
        let conn = setup();
        assert_eq!(usage_count(&conn, UserId::new(9), "riddle", day(1)).unwrap(), 0);
        assert!(list_usage_on(&conn, UserId::new(9), day(1)).unwrap().is_empty());
    }

    #[test]
    fn list_between_is_bounded_and_newest_first() {
        let conn = setup();
        let uid = UserId::new(7);
        for d in 1..=6 {
            for _ in 0..d {
                increment_usage(&conn, uid, "riddle", day(d), at(d, 12)).unwrap();
            }
        }

        let rows = list_usage_between(&conn, uid, "riddle", day(2), day(4)).unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.usage_date).collect();
        assert_eq!(dates, vec![day(4), day(3), day(2)]);
        assert_eq!(rows[0].usage_count, 4);
    }

    #[test]
    fn list_on_returns_all_features_for_day() {
        let conn = setup();
        let uid = UserId::new(7);
        increment_usage(&conn, uid, "snake", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, uid, "riddle", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, uid, "riddle", day(2), at(2, 12)).unwrap();

        let rows = list_usage_on(&conn, uid, day(1)).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.feature_name.as_str()).collect();
        assert_eq!(names, vec!["riddle", "snake"]);
    }

    #[test]
    fn delete_only_touches_requested_day() {
        let conn = setup();
        let uid = UserId::new(7);
        increment_usage(&conn, uid, "riddle", day(1), at(1, 12)).unwrap();
        increment_usage(&conn, uid, "riddle", day(2), at(2, 12)).unwrap();
        increment_usage(&conn, uid, "snake", day(2), at(2, 12)).unwrap();

        assert_eq!(delete_usage(&conn, uid, Some("riddle"), day(2)).unwrap(), 1);
        assert_eq!(usage_count(&conn, uid, "riddle", day(2)).unwrap(), 0);
        assert_eq!(usage_count(&conn, uid, "snake", day(2)).unwrap(), 1);
        assert_eq!(usage_count(&conn, uid, "riddle", day(1)).unwrap(), 1);

        assert_eq!(delete_usage(&conn, uid, None, day(2)).unwrap(), 1);
        assert_eq!(usage_count(&conn, uid, "snake", day(2)).unwrap(), 0);
        assert_eq!(usage_count(&conn, uid, "riddle", day(1)).unwrap(), 1);
    }
}
