//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use aq_core::{Error, Result};
use rusqlite::Connection;

/// V1: per-day feature usage counters.
const V1_FEATURE_USAGE: &str = r#"
CREATE TABLE feature_usage (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL,
    feature_name TEXT NOT NULL,
    usage_date   TEXT NOT NULL,
    usage_count  INTEGER NOT NULL DEFAULT 1,
    last_used_at TEXT NOT NULL,
    UNIQUE (user_id, feature_name, usage_date)
);

CREATE INDEX idx_feature_usage_lookup ON feature_usage(user_id, feature_name, usage_date);
"#;

/// V2: index for the "everything this user did today" summary.
const V2_USER_DAY_INDEX: &str = r#"
CREATE INDEX idx_feature_usage_user_day ON feature_usage(user_id, usage_date);
"#;

/// Ordered list of (version, sql).
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_FEATURE_USAGE), (2, V2_USER_DAY_INDEX)];

/// Apply every migration that has not been recorded in `schema_migrations`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}

/// Highest migration version recorded in the database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // second call is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_tables_and_indexes_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for (kind, name) in [
            ("table", "feature_usage"),
            ("table", "schema_migrations"),
            ("index", "idx_feature_usage_lookup"),
            ("index", "idx_feature_usage_user_day"),
        ] {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type=?1 AND name=?2",
                    [kind, name],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "{kind} {name} should exist");
        }
    }

    #[test]
    fn test_natural_key_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO feature_usage (user_id, feature_name, usage_date, last_used_at)
                      VALUES (7, 'riddle', '2024-05-01', '2024-05-01T12:00:00+00:00')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
