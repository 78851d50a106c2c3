//! Multi-token crowdfund
//!
//! Contributors choose which allow-listed token to pledge. Campaign totals
//! and contribution sums add raw amounts across tokens, while refunds and
//! payouts move each token separately.

use types::errors::CrowdfundError;
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::Amount;

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::crowdfund::{Crowdfund, CrowdfundLedger, TokenRouter};
use crate::gateway::TokenGateway;

/// Router over a fixed allow-list of tokens.
#[derive(Debug, Clone)]
pub struct TokenAllowList<G> {
    gateways: Vec<G>,
}

impl<G: TokenGateway> TokenAllowList<G> {
    /// Fails with `EmptyTokensArray` for an empty list and `ZeroAddress` if
    /// any gateway moves the null token.
    pub fn new(gateways: Vec<G>) -> Result<Self, CrowdfundError> {
        if gateways.is_empty() {
            return Err(CrowdfundError::EmptyTokensArray);
        }
        if gateways.iter().any(|g| g.token().is_zero()) {
            return Err(CrowdfundError::ZeroAddress);
        }
        Ok(Self { gateways })
    }

    pub fn contains(&self, token: TokenId) -> bool {
        self.gateways.iter().any(|g| g.token() == token)
    }

    pub fn gateways(&self) -> &[G] {
        &self.gateways
    }
}

impl<G: TokenGateway> TokenRouter for TokenAllowList<G> {
    type Gateway = G;

    fn tokens(&self) -> Vec<TokenId> {
        self.gateways.iter().map(|g| g.token()).collect()
    }

    fn route(&self, token: TokenId) -> Result<&G, CrowdfundError> {
        if token.is_zero() {
            return Err(CrowdfundError::ZeroAddress);
        }
        self.gateways
            .iter()
            .find(|g| g.token() == token)
            .ok_or(CrowdfundError::TokenNotAvailable { token })
    }
}

/// Crowdfund ledger over an allow-list of tokens.
pub type MultiTokenCrowdfund<G, C> = CrowdfundLedger<TokenAllowList<G>, C>;

impl<G: TokenGateway, C: Clock> CrowdfundLedger<TokenAllowList<G>, C> {
    pub fn new(gateways: Vec<G>, clock: C) -> Result<Self, CrowdfundError> {
        Self::with_config(gateways, clock, LedgerConfig::default())
    }

    pub fn with_config(
        gateways: Vec<G>,
        clock: C,
        config: LedgerConfig,
    ) -> Result<Self, CrowdfundError> {
        Ok(Self::from_router(TokenAllowList::new(gateways)?, clock, config))
    }

    /// Pledge `amount` of `token` to campaign `id`.
    ///
    /// Checked in order: campaign exists, campaign running, token non-null,
    /// amount non-zero, token allow-listed, caller is not the creator. The
    /// pull from that token's gateway happens last.
    pub fn contribute(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), CrowdfundError> {
        self.contribute_token(caller, id, token, amount)
    }

    /// The allow-list in configuration order.
    pub fn get_tokens(&self) -> Vec<TokenId> {
        self.router().tokens()
    }
}
