//! Single-token crowdfund
//!
//! Every pledge, refund and payout moves the one token the ledger was
//! constructed with.

use types::errors::CrowdfundError;
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::Amount;

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::crowdfund::{Crowdfund, CrowdfundLedger, TokenRouter};
use crate::gateway::TokenGateway;

/// Router accepting exactly one token.
#[derive(Debug, Clone)]
pub struct SingleToken<G> {
    gateway: G,
}

impl<G: TokenGateway> SingleToken<G> {
    /// Fails with `ZeroAddress` if the gateway moves the null token.
    pub fn new(gateway: G) -> Result<Self, CrowdfundError> {
        if gateway.token().is_zero() {
            return Err(CrowdfundError::ZeroAddress);
        }
        Ok(Self { gateway })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<G: TokenGateway> TokenRouter for SingleToken<G> {
    type Gateway = G;

    fn tokens(&self) -> Vec<TokenId> {
        vec![self.gateway.token()]
    }

    fn route(&self, token: TokenId) -> Result<&G, CrowdfundError> {
        if token.is_zero() {
            return Err(CrowdfundError::ZeroAddress);
        }
        if token != self.gateway.token() {
            return Err(CrowdfundError::TokenNotAvailable { token });
        }
        Ok(&self.gateway)
    }
}

/// Crowdfund ledger over a single token.
pub type SingleTokenCrowdfund<G, C> = CrowdfundLedger<SingleToken<G>, C>;

impl<G: TokenGateway, C: Clock> CrowdfundLedger<SingleToken<G>, C> {
    pub fn new(gateway: G, clock: C) -> Result<Self, CrowdfundError> {
        Self::with_config(gateway, clock, LedgerConfig::default())
    }

    pub fn with_config(gateway: G, clock: C, config: LedgerConfig) -> Result<Self, CrowdfundError> {
        Ok(Self::from_router(SingleToken::new(gateway)?, clock, config))
    }

    /// Pledge `amount` of the ledger's token to campaign `id`.
    ///
    /// Checked in order: campaign exists, campaign running, amount non-zero,
    /// caller is not the creator. The pull happens last.
    pub fn contribute(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        amount: Amount,
    ) -> Result<(), CrowdfundError> {
        let token = self.get_token();
        self.contribute_token(caller, id, token, amount)
    }

    /// The token this ledger accepts.
    pub fn get_token(&self) -> TokenId {
        self.router().gateway().token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gateway::InMemoryToken;

    #[test]
    fn test_rejects_null_token() {
        let token = InMemoryToken::with_id(TokenId::ZERO, "NULL");
        let result = SingleTokenCrowdfund::new(token.gateway(AccountId::new()), ManualClock::new(0));
        assert!(matches!(result, Err(CrowdfundError::ZeroAddress)));
    }

    #[test]
    fn test_get_token() {
        let token = InMemoryToken::new("MTK");
        let ledger =
            SingleTokenCrowdfund::new(token.gateway(AccountId::new()), ManualClock::new(0)).unwrap();
        assert_eq!(ledger.get_token(), token.id());
        assert_eq!(ledger.accepted_tokens(), vec![token.id()]);
    }

    #[test]
    fn test_route_rejects_foreign_token() {
        let token = InMemoryToken::new("MTK");
        let router = SingleToken::new(token.gateway(AccountId::new())).unwrap();
        let other = TokenId::new();
        assert!(matches!(
            router.route(other),
            Err(CrowdfundError::TokenNotAvailable { token }) if token == other
        ));
        assert!(matches!(
            router.route(TokenId::ZERO),
            Err(CrowdfundError::ZeroAddress)
        ));
    }
}
