//! aq-usage: daily feature-usage quotas.
//!
//! [`UsageTracker`] counts uses of a named feature per user per reference
//! day (America/New_York by default) and answers "may this user play again
//! today?". It fails open: storage trouble reads as zero usage and never
//! denies a use.
//!
//! ```
//! use aq_core::UserId;
//! use aq_db::pool::init_memory_pool;
//! use aq_usage::{ReferenceZone, UsageTracker};
//!
//! let tracker = UsageTracker::with_pool(init_memory_pool().unwrap(), ReferenceZone::default());
//! let user = UserId::new(7);
//!
//! for _ in 0..3 {
//!     tracker.record_usage(user, "riddle");
//! }
//! assert_eq!(tracker.usage_today(user, "riddle"), 3);
//! assert!(tracker.can_use(user, "riddle", 5));
//! assert!(!tracker.can_use(user, "riddle", 3));
//! ```

pub mod clock;
pub mod store;
pub mod tracker;

pub use clock::{Clock, ManualClock, ReferenceClock, ReferenceZone, SystemClock};
pub use store::{DailyUsage, FeatureCount, SqliteUsageStore, UsageStore};
pub use tracker::{is_unlimited, UsageStats, UsageStatus, UsageTracker};
