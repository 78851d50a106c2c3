//! Simulation error types

use thiserror::Error;
use types::errors::{CrowdfundError, GatewayError};
use types::ids::{CampaignId, TokenId};
use types::numeric::Amount;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A ledger invariant observed broken after a step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("Campaign {campaign}: total raised {total_raised} != sum of entries {entries}")]
    TotalMismatch {
        campaign: CampaignId,
        total_raised: Amount,
        entries: Amount,
    },

    #[error("Campaign {campaign} was both withdrawn and refunded")]
    DoubleSettlement { campaign: CampaignId },

    #[error("Token {token}: custody holds {held}, open campaigns account for {expected}")]
    CustodyMismatch {
        token: TokenId,
        held: Amount,
        expected: Amount,
    },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Ledger setup failed: {0}")]
    Ledger(#[from] CrowdfundError),

    #[error("Token setup failed: {0}")]
    Token(#[from] GatewayError),

    #[error("Step {step}: {violation}")]
    Invariant {
        step: usize,
        violation: InvariantViolation,
    },
}
