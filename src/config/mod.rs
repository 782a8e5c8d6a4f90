// ABOUTME: Engine configuration aggregate with validation and env overrides
// ABOUTME: Defaults carry the tuned production constants; global() gives a validated singleton
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Engine Configuration
//!
//! Type-safe configuration for every tunable in the pipeline. Defaults encode
//! the shipped constants; individual values can be overridden through
//! environment variables (`ADVICE_*`) and the aggregate is validated before
//! use. The engine takes its config by value, so tests construct their own;
//! [`AdviceConfig::global`] exists for callers that want the ambient
//! environment-driven instance.

pub mod scoring;
pub mod session;
pub mod ttl;

pub use scoring::ScoringConfig;
pub use session::SessionConfig;
pub use ttl::TtlConfig;

use crate::errors::{AdviceError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static ADVICE_CONFIG: OnceLock<AdviceConfig> = OnceLock::new();

/// Result-cache tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window for a fingerprint-matched cached result
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_ms: 5 * 60 * 1000 }
    }
}

/// Feedback-store retention and dismiss-classification tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Tracking stats are pruned after this many days without an impression
    pub tracking_retention_days: i64,
    /// Ratings are pruned after this many days without a vote
    pub rating_retention_days: i64,
    /// A dismissal faster than this counts as a quick dismiss
    pub quick_dismiss_threshold_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            tracking_retention_days: 30,
            rating_retention_days: 60,
            quick_dismiss_threshold_ms: 1_500,
        }
    }
}

/// Achievement tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementConfig {
    /// A combo achievement is not re-awarded within this many days
    pub combo_cooldown_days: i64,
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self { combo_cooldown_days: 7 }
    }
}

/// Main configuration container for the advice engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceConfig {
    /// Smart-score weights and thresholds
    pub scoring: ScoringConfig,
    /// Session gate and category-cap limits
    pub session: SessionConfig,
    /// Dynamic display-duration parameters
    pub ttl: TtlConfig,
    /// Result-cache freshness
    pub cache: CacheConfig,
    /// Feedback retention and dismiss classification
    pub feedback: FeedbackConfig,
    /// Achievement cooldowns
    pub achievements: AchievementConfig,
}

impl AdviceConfig {
    /// Get the global configuration instance, loading it on first use.
    /// Falls back to defaults (with a warning) if the environment holds
    /// invalid overrides.
    pub fn global() -> &'static Self {
        ADVICE_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("failed to load advice config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from defaults plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed or the final
    /// configuration fails validation.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        override_from_env("ADVICE_CTR_WEIGHT", &mut self.scoring.ctr_weight)?;
        override_from_env("ADVICE_RECENCY_WEIGHT", &mut self.scoring.recency_weight)?;
        override_from_env("ADVICE_RELEVANCE_WEIGHT", &mut self.scoring.relevance_weight)?;
        override_from_env("ADVICE_MAX_PER_SESSION", &mut self.session.max_per_session)?;
        override_from_env("ADVICE_COOLDOWN_MS", &mut self.session.cooldown_ms)?;
        override_from_env("ADVICE_MAX_PER_CATEGORY", &mut self.session.max_per_category)?;
        override_from_env("ADVICE_CACHE_TTL_MS", &mut self.cache.ttl_ms)?;
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on out-of-range values.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("ctr_weight", self.scoring.ctr_weight),
            ("recency_weight", self.scoring.recency_weight),
            ("relevance_weight", self.scoring.relevance_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                warn!("scoring weight {name} = {value} outside [0, 1]");
                return Err(AdviceError::InvalidConfig("scoring weights must be within [0, 1]"));
            }
        }
        if self.session.max_per_session == 0 {
            return Err(AdviceError::InvalidConfig("max_per_session must be positive"));
        }
        if self.session.max_per_category == 0 {
            return Err(AdviceError::InvalidConfig("max_per_category must be positive"));
        }
        if self.ttl.min_ms > self.ttl.max_ms {
            return Err(AdviceError::InvalidConfig("ttl.min_ms must be <= ttl.max_ms"));
        }
        if self.ttl.ms_per_char == 0 {
            return Err(AdviceError::InvalidConfig("ttl.ms_per_char must be positive"));
        }
        Ok(())
    }
}

/// Overwrite `target` from an environment variable when present.
fn override_from_env<T: FromStr>(var: &'static str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(var) {
        *target = raw
            .parse()
            .map_err(|_| AdviceError::InvalidEnvValue { var, value: raw })?;
    }
    Ok(())
}
