use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arcade-quota")]
#[command(author, version, about = "Daily per-feature usage quotas for the arcade")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides server.db_path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print today's reference date
    Today,

    /// Show a user's standing for a feature
    Status {
        user: i64,
        feature: String,

        /// Daily limit to check against (defaults to the configured one)
        #[arg(long)]
        limit: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record one use of a feature
    Record { user: i64, feature: String },

    /// Show usage history for a feature
    Stats {
        user: i64,
        feature: String,

        /// Number of days, today included
        #[arg(short, long, default_value = "7")]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete today's usage for a user
    Reset {
        user: i64,

        /// Only reset this feature
        #[arg(short, long)]
        feature: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
