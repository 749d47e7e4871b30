//! Application context shared by all request handlers.

use std::sync::Arc;

use aq_core::config::Config;
use aq_db::pool::DbPool;
use aq_usage::{ReferenceZone, UsageTracker};

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Quota tracker over `db`.
    pub tracker: Arc<UsageTracker>,
}

impl AppContext {
    /// Build a context whose tracker reads the wall clock in the configured
    /// reference timezone.
    pub fn new(config: Config, db: DbPool) -> Self {
        let zone = ReferenceZone::resolve(&config.usage.reference_timezone);
        let tracker = UsageTracker::with_pool(db.clone(), zone);
        Self::with_tracker(config, db, tracker)
    }

    /// Build a context around an existing tracker.
    pub fn with_tracker(config: Config, db: DbPool, tracker: UsageTracker) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tracker: Arc::new(tracker),
        }
    }

    /// Daily allowance configured for a feature.
    pub fn limit_for(&self, feature: &str) -> i64 {
        self.config.usage.limit_for(feature)
    }
}
