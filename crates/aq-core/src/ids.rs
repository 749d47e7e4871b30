//! Typed identifiers for the two halves of a usage key.
//!
//! User ids are owned by the surrounding platform and arrive as plain
//! integers; feature names are short string keys validated at the edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Maximum length of a feature key.
pub const MAX_FEATURE_NAME_LEN: usize = 64;

/// Identifier of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Validated key naming a quota-gated feature (e.g. `riddle`, `word_finder`).
///
/// Accepts 1 to [`MAX_FEATURE_NAME_LEN`] ASCII letters, digits, `_`, `-`
/// or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureName(String);

impl FeatureName {
    /// Validate and wrap a feature key.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Validation("feature name is empty".into()));
        }
        if name.len() > MAX_FEATURE_NAME_LEN {
            return Err(Error::Validation(format!(
                "feature name longer than {MAX_FEATURE_NAME_LEN} characters"
            )));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(Error::Validation(format!(
                "feature name contains invalid character {bad:?}"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FeatureName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FeatureName {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FeatureName {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeatureName> for String {
    fn from(name: FeatureName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_display_and_parse() {
        let id = UserId::new(42);
        assert_eq!(id.to_string(), "42");
        let parsed: UserId = " 42 ".parse().unwrap();
        assert_eq!(parsed, id);
        assert!("forty-two".parse::<UserId>().is_err());
    }

    #[test]
    fn user_id_serde_is_transparent() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back.get(), 7);
    }

    #[test]
    fn feature_name_accepts_game_keys() {
        for name in ["riddle", "word_finder", "arcade.snake", "daily-challenge-2"] {
            assert_eq!(FeatureName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn feature_name_rejects_bad_input() {
        assert!(FeatureName::new("").is_err());
        assert!(FeatureName::new("has space").is_err());
        assert!(FeatureName::new("semi;colon").is_err());
        assert!(FeatureName::new("x".repeat(MAX_FEATURE_NAME_LEN + 1)).is_err());
        assert!(FeatureName::new("x".repeat(MAX_FEATURE_NAME_LEN)).is_ok());
    }

    #[test]
    fn feature_name_deserialize_validates() {
        let ok: FeatureName = serde_json::from_str("\"riddle\"").unwrap();
        assert_eq!(ok.as_str(), "riddle");
        assert!(serde_json::from_str::<FeatureName>("\"bad name\"").is_err());
    }
}
