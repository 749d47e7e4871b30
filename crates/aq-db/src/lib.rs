//! aq-db: database access and persistence layer.
//!
//! SQLite-backed storage with r2d2 connection pooling, embedded migrations,
//! the [`models::FeatureUsage`] row type, and the query functions the usage
//! tracker builds on.
//!
//! # Example
//!
//! ```
//! use aq_core::UserId;
//! use aq_db::pool::{get_conn, init_memory_pool};
//! use aq_db::queries::feature_usage;
//! use chrono::{NaiveDate, Utc};
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//!
//! let count = feature_usage::increment_usage(&conn, UserId::new(7), "riddle", day, Utc::now()).unwrap();
//! assert_eq!(count, 1);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
