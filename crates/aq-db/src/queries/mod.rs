//! Database query modules.

pub mod feature_usage;
