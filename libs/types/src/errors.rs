//! Error types for the crowdfunding ledger
//!
//! Every precondition failure has its own variant carrying the values the
//! decision was made against.

use crate::ids::{AccountId, CampaignId, TokenId};
use crate::numeric::{Amount, Duration, Timestamp};
use thiserror::Error;

/// Failures reported by a token gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Insufficient allowance: spender {spender}, allowance {allowance}, requested {requested}")]
    InsufficientAllowance {
        spender: AccountId,
        allowance: Amount,
        requested: Amount,
    },

    #[error("Insufficient balance for {account}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("Arithmetic overflow in token balance")]
    Overflow,
}

/// Ledger operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrowdfundError {
    #[error("Campaign goal must be positive")]
    ZeroGoal,

    #[error("Campaign duration must be positive")]
    ZeroDuration,

    #[error("Campaign duration exceeds configured maximum of {max}s")]
    DurationTooLong { max: Duration },

    #[error("Campaign does not exist: {id}")]
    CampaignNotFound { id: CampaignId },

    #[error("Campaign ended at {deadline}")]
    CampaignEnded { deadline: Timestamp },

    #[error("Campaign has not ended: deadline {deadline}")]
    CampaignNotEnded { deadline: Timestamp },

    #[error("Contribution amount must be positive")]
    ZeroContribution,

    #[error("Campaign creator cannot contribute to own campaign")]
    ContributeByCreator,

    #[error("Caller has no contribution to this campaign")]
    ZeroContributions,

    #[error("Null identity is not allowed")]
    ZeroAddress,

    #[error("Caller is not the campaign creator: creator is {creator}")]
    NotCampaignCreator { creator: AccountId },

    #[error("Campaign goal not reached: goal {goal}, raised {total_raised}")]
    CampaignGoalNotReached { goal: Amount, total_raised: Amount },

    #[error("Campaign goal reached: goal {goal}, raised {total_raised}")]
    CampaignGoalReached { goal: Amount, total_raised: Amount },

    #[error("Campaign funds already withdrawn")]
    AlreadyWithdrawn,

    #[error("Token allow-list must not be empty")]
    EmptyTokensArray,

    #[error("Token not available: {token}")]
    TokenNotAvailable { token: TokenId },

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Arithmetic overflow in ledger accounting")]
    Overflow,

    #[error("Token gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl CrowdfundError {
    /// Stable short name of the error kind, used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ZeroGoal => "ZeroGoal",
            Self::ZeroDuration => "ZeroDuration",
            Self::DurationTooLong { .. } => "DurationTooLong",
            Self::CampaignNotFound { .. } => "CampaignNotFound",
            Self::CampaignEnded { .. } => "CampaignEnded",
            Self::CampaignNotEnded { .. } => "CampaignNotEnded",
            Self::ZeroContribution => "ZeroContribution",
            Self::ContributeByCreator => "ContributeByCreator",
            Self::ZeroContributions => "ZeroContributions",
            Self::ZeroAddress => "ZeroAddress",
            Self::NotCampaignCreator { .. } => "NotCampaignCreator",
            Self::CampaignGoalNotReached { .. } => "CampaignGoalNotReached",
            Self::CampaignGoalReached { .. } => "CampaignGoalReached",
            Self::AlreadyWithdrawn => "AlreadyWithdrawn",
            Self::EmptyTokensArray => "EmptyTokensArray",
            Self::TokenNotAvailable { .. } => "TokenNotAvailable",
            Self::Reentrancy => "Reentrancy",
            Self::Overflow => "Overflow",
            Self::Gateway(GatewayError::InsufficientAllowance { .. }) => "InsufficientAllowance",
            Self::Gateway(GatewayError::InsufficientBalance { .. }) => "InsufficientBalance",
            Self::Gateway(GatewayError::Overflow) => "GatewayOverflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_not_found_display() {
        let err = CrowdfundError::CampaignNotFound {
            id: CampaignId::new(3),
        };
        assert_eq!(err.to_string(), "Campaign does not exist: 3");
    }

    #[test]
    fn test_goal_not_reached_display() {
        let err = CrowdfundError::CampaignGoalNotReached {
            goal: 100,
            total_raised: 1,
        };
        assert!(err.to_string().contains("goal 100"));
        assert!(err.to_string().contains("raised 1"));
    }

    #[test]
    fn test_crowdfund_error_from_gateway() {
        let gateway_err = GatewayError::InsufficientAllowance {
            spender: AccountId::new(),
            allowance: 5,
            requested: 10,
        };
        let err: CrowdfundError = gateway_err.into();
        assert!(matches!(err, CrowdfundError::Gateway(_)));
        assert_eq!(err.kind(), "InsufficientAllowance");
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(CrowdfundError::AlreadyWithdrawn.kind(), "AlreadyWithdrawn");
        assert_eq!(
            CrowdfundError::CampaignEnded { deadline: 10 }.kind(),
            "CampaignEnded"
        );
    }
}
