//! Engine configuration
//!
//! Size and age limits consulted by the pruner.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

/// Version count above which a `push` triggers pruning
pub const DEFAULT_PRUNE_THRESHOLD: usize = 1000;

/// Off-path leaves older than this are swept (7 days)
pub const DEFAULT_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: usize,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_prune_threshold() -> usize {
    DEFAULT_PRUNE_THRESHOLD
}

fn default_max_age_secs() -> u64 {
    DEFAULT_MAX_AGE_SECS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl HistoryConfig {
    /// Parse and validate a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.prune_threshold = threshold;
        self
    }

    pub fn with_max_age_secs(mut self, secs: u64) -> Self {
        self.max_age_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prune_threshold == 0 {
            return Err(HistoryError::InvalidConfig(String::from(
                "prune_threshold must be at least 1",
            )));
        }
        let secs = i64::try_from(self.max_age_secs).map_err(|_| {
            HistoryError::InvalidConfig(format!("max_age_secs {} is too large", self.max_age_secs))
        })?;
        if TimeDelta::try_seconds(secs).is_none() {
            return Err(HistoryError::InvalidConfig(format!(
                "max_age_secs {} is too large",
                self.max_age_secs
            )));
        }
        Ok(())
    }

    /// Maximum age as a signed duration, saturating on overflow
    pub fn max_age(&self) -> TimeDelta {
        i64::try_from(self.max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = HistoryConfig::default();
        assert_eq!(config.prune_threshold, 1000);
        assert_eq!(config.max_age(), TimeDelta::days(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = HistoryConfig::from_json(r#"{"prune_threshold": 50}"#).unwrap();
        assert_eq!(config.prune_threshold, 50);
        assert_eq!(config.max_age_secs, DEFAULT_MAX_AGE_SECS);
    }

    #[test]
    fn test_from_json_empty_object() {
        let config = HistoryConfig::from_json("{}").unwrap();
        assert_eq!(config, HistoryConfig::default());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = HistoryConfig::from_json(r#"{"prune_threshold": 0}"#).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidConfig(_)));
    }

    #[test]
    fn test_huge_max_age_rejected() {
        let config = HistoryConfig::default().with_max_age_secs(u64::MAX);
        assert!(matches!(config.validate(), Err(HistoryError::InvalidConfig(_))));
        assert_eq!(config.max_age(), TimeDelta::MAX);
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let err = HistoryConfig::from_json("[1, 2").unwrap_err();
        assert!(matches!(err, HistoryError::Json(_)));
    }
}
