//! Ledger events
//!
//! Immutable records of successful operations. Failed operations never
//! append an event.

use serde::{Deserialize, Serialize};
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::{Amount, Timestamp};

/// A new campaign was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub campaign_id: CampaignId,
    pub creator: AccountId,
    pub goal: Amount,
    pub deadline: Timestamp,
}

/// Tokens were pledged to a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionMade {
    pub campaign_id: CampaignId,
    pub contributor: AccountId,
    pub token: TokenId,
    pub amount: Amount,
    pub at: Timestamp,
}

/// A contributor withdrew their whole pledge before the deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCancelled {
    pub campaign_id: CampaignId,
    pub contributor: AccountId,
    pub amount: Amount,
    pub at: Timestamp,
}

/// The creator collected the funds of a successful campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub campaign_id: CampaignId,
    pub creator: AccountId,
    pub amount: Amount,
    pub at: Timestamp,
}

/// A contributor reclaimed their pledge from a failed campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refunded {
    pub campaign_id: CampaignId,
    pub contributor: AccountId,
    pub amount: Amount,
    pub at: Timestamp,
}

/// Enum wrapper for all ledger events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    CampaignCreated(CampaignCreated),
    ContributionMade(ContributionMade),
    ContributionCancelled(ContributionCancelled),
    FundsWithdrawn(FundsWithdrawn),
    Refunded(Refunded),
}

impl ContractEvent {
    /// Campaign the event belongs to.
    pub fn campaign_id(&self) -> CampaignId {
        match self {
            Self::CampaignCreated(e) => e.campaign_id,
            Self::ContributionMade(e) => e.campaign_id,
            Self::ContributionCancelled(e) => e.campaign_id,
            Self::FundsWithdrawn(e) => e.campaign_id,
            Self::Refunded(e) => e.campaign_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_made_serialization() {
        let event = ContributionMade {
            campaign_id: CampaignId::new(1),
            contributor: AccountId::new(),
            token: TokenId::new(),
            amount: 100,
            at: 1_708_123_456,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: ContributionMade = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_campaign_id() {
        let event = ContractEvent::FundsWithdrawn(FundsWithdrawn {
            campaign_id: CampaignId::new(4),
            creator: AccountId::new(),
            amount: 100,
            at: 10,
        });
        assert!(matches!(event, ContractEvent::FundsWithdrawn(_)));
        assert_eq!(event.campaign_id(), CampaignId::new(4));
    }
}
