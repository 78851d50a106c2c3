//! Simulation configuration
//!
//! Loaded from JSON; any omitted field takes its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use types::numeric::{Amount, Duration};

use crate::errors::ConfigError;

/// Inclusive sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Master seed; every bot seed and identity derives from it
    pub seed: u64,
    /// Campaigns opened before the first step, one creator each
    pub campaigns: usize,
    pub contributors: usize,
    pub steps: usize,
    pub goal: Bounds<Amount>,
    /// Campaign duration in seconds
    pub duration: Bounds<Duration>,
    /// Pledge size; a zero minimum lets bots hit the zero-amount path
    pub amount: Bounds<Amount>,
    /// Largest single clock jump in seconds
    pub max_clock_step: Duration,
    /// Run the allow-list ledger instead of the single-token one
    pub multi_token: bool,
    /// Allow-listed tokens when `multi_token` is set
    pub token_count: usize,
    /// Balance minted and allowance granted per contributor per token
    pub allowance: Amount,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            campaigns: 8,
            contributors: 16,
            steps: 2_000,
            goal: Bounds::new(500, 5_000),
            duration: Bounds::new(600, 7_200),
            amount: Bounds::new(0, 1_000),
            max_clock_step: 900,
            multi_token: false,
            token_count: 3,
            allowance: 50_000,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.campaigns == 0 {
            return Err(ConfigError::Invalid("campaigns must be at least 1".into()));
        }
        if self.contributors == 0 {
            return Err(ConfigError::Invalid("contributors must be at least 1".into()));
        }
        if !self.goal.is_valid() || self.goal.min == 0 {
            return Err(ConfigError::Invalid("goal range must be non-empty and positive".into()));
        }
        if !self.duration.is_valid() || self.duration.min == 0 {
            return Err(ConfigError::Invalid(
                "duration range must be non-empty and positive".into(),
            ));
        }
        if !self.amount.is_valid() {
            return Err(ConfigError::Invalid("amount range is empty".into()));
        }
        if self.max_clock_step == 0 {
            return Err(ConfigError::Invalid("max_clock_step must be positive".into()));
        }
        if self.multi_token && self.token_count == 0 {
            return Err(ConfigError::Invalid("token_count must be at least 1".into()));
        }
        Ok(())
    }

    /// Tokens the run actually deploys.
    pub fn deployed_tokens(&self) -> usize {
        if self.multi_token {
            self.token_count
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            SimulationConfig::from_json_str(r#"{"seed": 7, "multi_token": true}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.multi_token);
        assert_eq!(config.steps, SimulationConfig::default().steps);
        assert_eq!(config.deployed_tokens(), 3);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result =
            SimulationConfig::from_json_str(r#"{"goal": {"min": 10, "max": 1}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = SimulationConfig::from_json_str("{ seed: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::from_json_file("/nonexistent/crowdfund-sim.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_single_token_deploys_one() {
        let config = SimulationConfig {
            token_count: 5,
            ..SimulationConfig::default()
        };
        assert_eq!(config.deployed_tokens(), 1);
    }
}
