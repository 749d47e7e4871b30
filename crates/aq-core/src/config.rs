//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, auth and usage sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Any daily limit at or above this value means "unlimited".
pub const UNLIMITED_DAILY_LIMIT: i64 = 999;

/// Timezone whose calendar day is the unit of quota reset.
pub const DEFAULT_REFERENCE_TIMEZONE: &str = "America/New_York";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub usage: UsageConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration from a file that must exist and parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.auth.enabled && self.auth.api_key.is_none() {
            warnings.push("auth is enabled but api_key is not set; admin routes are locked".into());
        }

        if self
            .usage
            .reference_timezone
            .parse::<chrono_tz::Tz>()
            .is_err()
        {
            warnings.push(format!(
                "usage.reference_timezone '{}' is not a known timezone; dates will fall back to UTC",
                self.usage.reference_timezone
            ));
        }

        if self.usage.default_daily_limit < 0 {
            warnings.push("usage.default_daily_limit is negative; every check will deny".into());
        }

        for (name, limit) in &self.usage.features {
            if crate::FeatureName::new(name.as_str()).is_err() {
                warnings.push(format!("usage.features key '{name}' is not a valid feature name"));
            }
            if *limit < 0 {
                warnings.push(format!("usage.features.{name} is negative; every check will deny"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("./data/arcade-quota.db"),
        }
    }
}

/// Admin authentication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
}

/// Daily quota settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// IANA timezone name used to compute the reference date.
    pub reference_timezone: String,
    /// Allowance for features without an explicit entry.
    pub default_daily_limit: i64,
    /// Per-feature allowances keyed by feature name.
    pub features: BTreeMap<String, i64>,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.into(),
            default_daily_limit: 5,
            features: BTreeMap::new(),
        }
    }
}

impl UsageConfig {
    /// Daily allowance for a feature.
    pub fn limit_for(&self, feature: &str) -> i64 {
        self.features
            .get(feature)
            .copied()
            .unwrap_or(self.default_daily_limit)
    }
}
