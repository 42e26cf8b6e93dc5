//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::slots::DEFAULT_STEP_MINUTES;

/// Tunables for slot generation and batch resolution.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing of the offered start-time grid. Independent of service length.
    pub step_minutes: i64,
    /// Upper bound on dates evaluated concurrently by the resolver.
    pub max_concurrent_days: usize,
    /// Window used when a caller asks for "the next available date" without
    /// naming a horizon.
    pub default_horizon_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_minutes: DEFAULT_STEP_MINUTES,
            max_concurrent_days: 8,
            default_horizon_days: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `InvalidConfig` when any tunable is not positive, or the step does not
    /// fit in a day.
    pub fn validate(&self) -> Result<()> {
        if self.step_minutes <= 0 || self.step_minutes > 24 * 60 {
            return Err(EngineError::InvalidConfig(format!(
                "step_minutes must be in 1..=1440, got {}",
                self.step_minutes
            )));
        }
        if self.max_concurrent_days == 0 {
            return Err(EngineError::InvalidConfig(
                "max_concurrent_days must be at least 1".to_string(),
            ));
        }
        if self.default_horizon_days == 0 {
            return Err(EngineError::InvalidConfig(
                "default_horizon_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
