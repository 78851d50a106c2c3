//! Ledger configuration

use serde::{Deserialize, Serialize};
use types::numeric::Duration;

/// Construction-time settings for a crowdfund ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Longest campaign a creator may open, in seconds. `None` means no bound.
    pub max_campaign_duration: Option<Duration>,
    /// Append successful operations to the in-process event log.
    pub record_events: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_campaign_duration: None,
            record_events: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_unbounded() {
        let config = LedgerConfig::default();
        assert_eq!(config.max_campaign_duration, None);
        assert!(config.record_events);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"max_campaign_duration": 3600}"#).unwrap();
        assert_eq!(config.max_campaign_duration, Some(3600));
        assert!(config.record_events);
    }
}
