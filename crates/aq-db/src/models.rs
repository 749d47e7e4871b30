//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use aq_core::UserId;
use chrono::NaiveDate;
use serde::Serialize;

/// Storage format of `usage_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a reference date the way it is stored.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored `usage_date` column.
fn parse_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// FeatureUsage
// ---------------------------------------------------------------------------

/// One row per (user, feature, reference date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureUsage {
    pub id: i64,
    pub user_id: UserId,
    pub feature_name: String,
    pub usage_date: NaiveDate,
    pub usage_count: i64,
    pub last_used_at: String,
}

impl FeatureUsage {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: UserId::new(row.get(1)?),
            feature_name: row.get(2)?,
            usage_date: parse_date(row, 3)?,
            usage_count: row.get(4)?,
            last_used_at: row.get(5)?,
        })
    }
}
