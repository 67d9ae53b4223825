//! Study settings.
//!
//! Settings live in the key-value store as individual entries rather than
//! one blob, so the surrounding application can read or write a single
//! knob without round-tripping the rest:
//!
//! - `settings.new_cards_per_day` -- number or `"unlimited"`
//! - `settings.max_reviews_per_day` -- number or `"unlimited"`
//! - `settings.auto_mature` -- bool
//! - `settings.learning_steps` -- two-element array of day counts
//! - `settings.session_cap` -- number or `"unlimited"`

use serde::{Deserialize, Serialize};

use super::Store;
use crate::error::{ConfigError, CoreError, StoreError};
use crate::quota::Limit;
use crate::scheduler::SchedulerConfig;

const KEY_NEW_CARDS: &str = "settings.new_cards_per_day";
const KEY_MAX_REVIEWS: &str = "settings.max_reviews_per_day";
const KEY_AUTO_MATURE: &str = "settings.auto_mature";
const KEY_LEARNING_STEPS: &str = "settings.learning_steps";
const KEY_SESSION_CAP: &str = "settings.session_cap";

/// Study configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Daily ceiling on never-before-seen cards introduced.
    #[serde(default = "default_new_cards_limit")]
    pub new_cards_limit: Limit,
    /// Daily ceiling on reviews performed.
    #[serde(default = "default_max_reviews_limit")]
    pub max_reviews_limit: Limit,
    /// Promote cards to mastered once their interval matures.
    #[serde(default = "default_true")]
    pub auto_mature: bool,
    /// Day counts for the first two successful reviews after a failure.
    #[serde(default = "default_learning_steps")]
    pub learning_steps: [u32; 2],
    /// Cap on the size of a single session batch.
    #[serde(default = "default_session_cap")]
    pub session_cap: Limit,
}

// Default functions
fn default_new_cards_limit() -> Limit {
    Limit::Limited(10)
}
fn default_max_reviews_limit() -> Limit {
    Limit::Limited(100)
}
fn default_true() -> bool {
    true
}
fn default_learning_steps() -> [u32; 2] {
    [1, 6]
}
fn default_session_cap() -> Limit {
    Limit::Unlimited
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            new_cards_limit: default_new_cards_limit(),
            max_reviews_limit: default_max_reviews_limit(),
            auto_mature: default_true(),
            learning_steps: default_learning_steps(),
            session_cap: default_session_cap(),
        }
    }
}

impl StudyConfig {
    /// Load settings from `store`, falling back to defaults for missing
    /// keys, then validate.
    pub fn load<S: Store>(store: &S) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let config = Self {
            new_cards_limit: store
                .get_json(KEY_NEW_CARDS)?
                .unwrap_or(defaults.new_cards_limit),
            max_reviews_limit: store
                .get_json(KEY_MAX_REVIEWS)?
                .unwrap_or(defaults.max_reviews_limit),
            auto_mature: store
                .get_json(KEY_AUTO_MATURE)?
                .unwrap_or(defaults.auto_mature),
            learning_steps: store
                .get_json(KEY_LEARNING_STEPS)?
                .unwrap_or(defaults.learning_steps),
            session_cap: store
                .get_json(KEY_SESSION_CAP)?
                .unwrap_or(defaults.session_cap),
        };
        config.validate()?;
        Ok(config)
    }

    /// Write every setting to its own key.
    pub fn save<S: Store>(&self, store: &mut S) -> Result<(), StoreError> {
        store.set_json(KEY_NEW_CARDS, &self.new_cards_limit)?;
        store.set_json(KEY_MAX_REVIEWS, &self.max_reviews_limit)?;
        store.set_json(KEY_AUTO_MATURE, &self.auto_mature)?;
        store.set_json(KEY_LEARNING_STEPS, &self.learning_steps)?;
        store.set_json(KEY_SESSION_CAP, &self.session_cap)?;
        Ok(())
    }

    /// Reject malformed settings at load time rather than clamping them
    /// silently inside the scheduler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.learning_steps.iter().any(|&step| step == 0) {
            return Err(ConfigError::InvalidValue {
                key: KEY_LEARNING_STEPS.to_string(),
                message: "learning steps must be at least 1 day".to_string(),
            });
        }
        Ok(())
    }

    /// The scheduler's view of these settings.
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            step1_days: self.learning_steps[0],
            step2_days: self.learning_steps[1],
            auto_mature: self.auto_mature,
        }
    }
}
