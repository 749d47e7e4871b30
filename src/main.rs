mod cli;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aq_core::config::Config;
use aq_core::{FeatureName, UserId};
use aq_db::pool::init_pool;
use aq_usage::{ReferenceClock, ReferenceZone, UsageTracker};
use clap::Parser;
use cli::{Cli, Commands};
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "arcade_quota=trace,aq_usage=trace,aq_server=debug,aq_db=debug,tower_http=debug"
                .to_string()
        } else {
            "arcade_quota=info,aq_usage=info,aq_server=info,aq_db=warn,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref());
    if let Some(db) = cli.db.clone() {
        config.server.db_path = db;
    }

    match cli.command {
        Commands::Start { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(aq_server::start(config, CancellationToken::new()))?;
            Ok(())
        }
        Commands::Today => {
            let zone = ReferenceZone::resolve(&config.usage.reference_timezone);
            let clock = ReferenceClock::system(zone);
            println!("{} ({})", clock.today(), zone.name());
            Ok(())
        }
        Commands::Status {
            user,
            feature,
            limit,
            json,
        } => {
            let feature = FeatureName::new(feature)?;
            let tracker = open_tracker(&config)?;
            let limit = limit.unwrap_or_else(|| config.usage.limit_for(feature.as_str()));
            let status = tracker.status(UserId::new(user), feature.as_str(), limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("User {user} / {feature} on {}", status.reference_date);
                println!("  Used today: {}", status.used_today);
                match status.remaining {
                    Some(left) => println!("  Remaining:  {left} of {}", status.daily_limit),
                    None => println!("  Remaining:  unlimited"),
                }
                println!("  Can use:    {}", if status.can_use { "yes" } else { "no" });
            }
            Ok(())
        }
        Commands::Record { user, feature } => {
            let feature = FeatureName::new(feature)?;
            let tracker = open_tracker(&config)?;
            let user = UserId::new(user);
            if !tracker.record_usage(user, feature.as_str()) {
                bail!("failed to record usage for user {user} / {feature}");
            }
            println!(
                "Recorded {feature} for user {user}: {} today",
                tracker.usage_today(user, feature.as_str())
            );
            Ok(())
        }
        Commands::Stats {
            user,
            feature,
            days,
            json,
        } => {
            let feature = FeatureName::new(feature)?;
            let tracker = open_tracker(&config)?;
            let stats = tracker.usage_stats(UserId::new(user), feature.as_str(), days);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("User {user} / {feature}, last {days} day(s):");
                for day in &stats.daily {
                    println!("  {}  {}", day.date, day.count);
                }
                println!("Total: {}", stats.total);
            }
            Ok(())
        }
        Commands::Reset { user, feature } => {
            let feature = feature.map(FeatureName::new).transpose()?;
            let tracker = open_tracker(&config)?;
            let user = UserId::new(user);
            if !tracker.reset_usage(user, feature.as_ref().map(FeatureName::as_str)) {
                bail!("failed to reset usage for user {user}");
            }
            match feature {
                Some(f) => println!("Reset today's {f} usage for user {user}"),
                None => println!("Reset today's usage for user {user}"),
            }
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => validate_config(config_path.or(cli.config).as_deref()),
        Commands::Version => {
            println!("arcade-quota {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Open the configured database and wrap it in a wall-clock tracker.
fn open_tracker(config: &Config) -> Result<UsageTracker> {
    let db_path: &PathBuf = &config.server.db_path;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    tracing::debug!("Opening database at {}", db_path.display());
    let pool = init_pool(&db_path.to_string_lossy())?;
    let zone = ReferenceZone::resolve(&config.usage.reference_timezone);
    Ok(UsageTracker::with_pool(pool, zone))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p).with_context(|| format!("loading {}", p.display()))?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  - {w}");
        }
    }
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Reference timezone: {}", config.usage.reference_timezone);
    println!("  Default daily limit: {}", config.usage.default_daily_limit);
    for (name, limit) in &config.usage.features {
        println!("    {name}: {limit}");
    }

    Ok(())
}
