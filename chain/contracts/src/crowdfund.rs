//! Crowdfund ledger: the public operation surface
//!
//! `CrowdfundLedger` wires the settlement rules to a clock and to a
//! `TokenRouter`, the small adapter that tells the variants apart:
//! `SingleToken` routes everything through one gateway, `TokenAllowList`
//! picks the gateway for the token named by the caller.
//!
//! Every mutating operation follows the same sequence:
//! 1. Acquire the reentrancy guard
//! 2. Read the clock once
//! 3. Check every precondition
//! 4. Commit the engine effects
//! 5. Move tokens through the gateway, restoring the checkpoint if that fails
//! 6. Record the event and release the guard
//!
//! Pledge preconditions run in this order: campaign exists, campaign running,
//! token non-null, amount non-zero, token accepted, caller is not the creator.

use tracing::{debug, error, warn};
use types::campaign::{Campaign, CampaignSummary};
use types::errors::{CrowdfundError, GatewayError};
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::{Amount, Duration};

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::events::{
    CampaignCreated, ContractEvent, ContributionCancelled, ContributionMade, FundsWithdrawn,
    Refunded,
};
use crate::gateway::TokenGateway;
use crate::security::ReentrancyGuard;
use crate::settlement::{Checkpoint, SettlementEngine, TransferPlan};

/// Resolves the gateway a token's movements go through.
pub trait TokenRouter {
    type Gateway: TokenGateway;

    /// Accepted tokens, in configuration order.
    fn tokens(&self) -> Vec<TokenId>;

    /// Gateway for `token`; `ZeroAddress` for the null token,
    /// `TokenNotAvailable` for a token outside the accepted set.
    fn route(&self, token: TokenId) -> Result<&Self::Gateway, CrowdfundError>;
}

/// Operations shared by every crowdfund ledger variant.
///
/// `caller` is the already-authenticated identity invoking the operation.
pub trait Crowdfund {
    fn create_campaign(
        &mut self,
        caller: AccountId,
        goal: Amount,
        duration: Duration,
    ) -> Result<CampaignId, CrowdfundError>;

    /// Pledge `amount` of `token` to campaign `id`.
    fn contribute_token(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), CrowdfundError>;

    /// Withdraw the caller's whole pledge before the deadline. Returns the amount returned.
    fn cancel_contribution(&mut self, caller: AccountId, id: CampaignId)
        -> Result<Amount, CrowdfundError>;

    /// Pay a successful campaign's funds to its creator. Returns the amount paid.
    fn withdraw_funds(&mut self, caller: AccountId, id: CampaignId)
        -> Result<Amount, CrowdfundError>;

    /// Return the caller's pledge from a failed campaign. Returns the amount returned.
    fn refund(&mut self, caller: AccountId, id: CampaignId) -> Result<Amount, CrowdfundError>;

    fn get_campaign(&self, id: CampaignId) -> Result<CampaignSummary, CrowdfundError>;

    /// Every campaign record, the sentinel at index 0 included.
    fn get_campaigns(&self) -> &[Campaign];

    fn get_contribution(
        &self,
        id: CampaignId,
        contributor: AccountId,
    ) -> Result<Amount, CrowdfundError>;

    /// Tokens this ledger accepts.
    fn accepted_tokens(&self) -> Vec<TokenId>;

    fn events(&self) -> &[ContractEvent];
}

/// Crowdfund ledger generic over its token routing and time source.
#[derive(Debug)]
pub struct CrowdfundLedger<R, C> {
    engine: SettlementEngine,
    router: R,
    clock: C,
    guard: ReentrancyGuard,
}

impl<R: TokenRouter, C: Clock> CrowdfundLedger<R, C> {
    /// Assemble a ledger from an already validated router.
    pub fn from_router(router: R, clock: C, config: LedgerConfig) -> Self {
        Self {
            engine: SettlementEngine::new(config),
            router,
            clock,
            guard: ReentrancyGuard::new(),
        }
    }

    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Handle on the guard held across every mutating operation.
    pub fn reentrancy_guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        self.engine.drain_events()
    }

    /// Run `op` with the reentrancy guard held.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, CrowdfundError>,
    ) -> Result<T, CrowdfundError> {
        let _hold = self.guard.enter()?;
        op(self)
    }

    fn contribute_locked(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), CrowdfundError> {
        let now = self.clock.now();
        self.engine.check_open_for(id, token, amount, now)?;
        let gateway = self.router.route(token)?;
        let checkpoint = self
            .engine
            .record_contribution(caller, id, token, amount)?;

        if let Err(err) = gateway.pull(caller, amount) {
            warn!(
                campaign_id = %id,
                contributor = %caller,
                amount = %amount,
                error = %err,
                "Token pull failed, rolling back contribution"
            );
            self.engine.restore(checkpoint);
            return Err(err.into());
        }

        self.engine
            .emit(ContractEvent::ContributionMade(ContributionMade {
                campaign_id: id,
                contributor: caller,
                token,
                amount,
                at: now,
            }));
        debug!(campaign_id = %id, contributor = %caller, amount = %amount, "Contribution recorded");
        Ok(())
    }

    /// Push every planned transfer out of custody.
    ///
    /// Every token is routed and its custody balance checked for the whole
    /// plan before the first push, so a failure restores the checkpoint
    /// without any token having moved.
    fn pay_out(&mut self, plan: &TransferPlan, checkpoint: Checkpoint) -> Result<Amount, CrowdfundError> {
        let mut legs = Vec::with_capacity(plan.transfers.len());
        for transfer in &plan.transfers {
            match self.router.route(transfer.token) {
                Ok(gateway) => legs.push((gateway, transfer)),
                Err(err) => {
                    error!(token = %transfer.token, error = %err, "Planned token has no gateway");
                    self.engine.restore(checkpoint);
                    return Err(err);
                }
            }
        }

        for (gateway, transfer) in &legs {
            let held = gateway.balance_of(gateway.custody());
            if held < transfer.amount {
                error!(
                    token = %transfer.token,
                    held = %held,
                    requested = %transfer.amount,
                    "Custody balance below ledger total"
                );
                self.engine.restore(checkpoint);
                return Err(GatewayError::InsufficientBalance {
                    account: gateway.custody(),
                    balance: held,
                    requested: transfer.amount,
                }
                .into());
            }
        }

        for (gateway, transfer) in &legs {
            if let Err(err) = gateway.push(transfer.to, transfer.amount) {
                error!(token = %transfer.token, error = %err, "Token push failed");
                self.engine.restore(checkpoint);
                return Err(err.into());
            }
        }
        Ok(plan.total())
    }
}

impl<R: TokenRouter, C: Clock> Crowdfund for CrowdfundLedger<R, C> {
    fn create_campaign(
        &mut self,
        caller: AccountId,
        goal: Amount,
        duration: Duration,
    ) -> Result<CampaignId, CrowdfundError> {
        self.guarded(|this| {
            let now = this.clock.now();
            let id = this.engine.create_campaign(caller, goal, duration, now)?;
            let deadline = this.engine.campaign(id)?.deadline;

            this.engine
                .emit(ContractEvent::CampaignCreated(CampaignCreated {
                    campaign_id: id,
                    creator: caller,
                    goal,
                    deadline,
                }));
            debug!(campaign_id = %id, creator = %caller, goal = %goal, deadline, "Campaign created");
            Ok(id)
        })
    }

    fn contribute_token(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), CrowdfundError> {
        self.guarded(|this| this.contribute_locked(caller, id, token, amount))
    }

    fn cancel_contribution(
        &mut self,
        caller: AccountId,
        id: CampaignId,
    ) -> Result<Amount, CrowdfundError> {
        self.guarded(|this| {
            let now = this.clock.now();
            let (plan, checkpoint) = this.engine.cancel_contribution(caller, id, now)?;
            let amount = this.pay_out(&plan, checkpoint)?;

            this.engine
                .emit(ContractEvent::ContributionCancelled(ContributionCancelled {
                    campaign_id: id,
                    contributor: caller,
                    amount,
                    at: now,
                }));
            debug!(campaign_id = %id, contributor = %caller, amount = %amount, "Contribution cancelled");
            Ok(amount)
        })
    }

    fn withdraw_funds(
        &mut self,
        caller: AccountId,
        id: CampaignId,
    ) -> Result<Amount, CrowdfundError> {
        self.guarded(|this| {
            let now = this.clock.now();
            let (plan, checkpoint) = this.engine.withdraw_funds(caller, id, now)?;
            let amount = this.pay_out(&plan, checkpoint)?;

            this.engine
                .emit(ContractEvent::FundsWithdrawn(FundsWithdrawn {
                    campaign_id: id,
                    creator: caller,
                    amount,
                    at: now,
                }));
            debug!(campaign_id = %id, creator = %caller, amount = %amount, "Funds withdrawn");
            Ok(amount)
        })
    }

    fn refund(&mut self, caller: AccountId, id: CampaignId) -> Result<Amount, CrowdfundError> {
        self.guarded(|this| {
            let now = this.clock.now();
            let (plan, checkpoint) = this.engine.refund(caller, id, now)?;
            let amount = this.pay_out(&plan, checkpoint)?;

            this.engine.emit(ContractEvent::Refunded(Refunded {
                campaign_id: id,
                contributor: caller,
                amount,
                at: now,
            }));
            debug!(campaign_id = %id, contributor = %caller, amount = %amount, "Contribution refunded");
            Ok(amount)
        })
    }

    fn get_campaign(&self, id: CampaignId) -> Result<CampaignSummary, CrowdfundError> {
        let now = self.clock.now();
        Ok(self.engine.campaign(id)?.summary(now))
    }

    fn get_campaigns(&self) -> &[Campaign] {
        self.engine.registry().all()
    }

    fn get_contribution(
        &self,
        id: CampaignId,
        contributor: AccountId,
    ) -> Result<Amount, CrowdfundError> {
        self.engine.campaign(id)?;
        if contributor.is_zero() {
            return Err(CrowdfundError::ZeroAddress);
        }
        Ok(self.engine.ledger().amount_of(id, contributor))
    }

    fn accepted_tokens(&self) -> Vec<TokenId> {
        self.router.tokens()
    }

    fn events(&self) -> &[ContractEvent] {
        self.engine.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gateway::InMemoryToken;
    use crate::settlement::Transfer;
    use crate::single::SingleTokenCrowdfund;

    #[test]
    fn test_operations_fail_while_guard_held() {
        let token = InMemoryToken::new("MTK");
        let mut ledger =
            SingleTokenCrowdfund::new(token.gateway(AccountId::new()), ManualClock::new(0)).unwrap();
        let hold = ledger.reentrancy_guard().enter().unwrap();

        assert_eq!(
            ledger.create_campaign(AccountId::new(), 10, 10),
            Err(CrowdfundError::Reentrancy)
        );
        assert_eq!(ledger.get_campaigns().len(), 1);
        assert!(ledger.events().is_empty());

        drop(hold);
        assert!(ledger.create_campaign(AccountId::new(), 10, 10).is_ok());
        assert!(!ledger.reentrancy_guard().is_locked());
    }

    #[test]
    fn test_pay_out_unroutable_token_restores_checkpoint() {
        let custody = AccountId::new();
        let alice = AccountId::new();
        let token = InMemoryToken::new("MTK");
        let mut ledger =
            SingleTokenCrowdfund::new(token.gateway(custody), ManualClock::new(0)).unwrap();
        let id = ledger.create_campaign(AccountId::new(), 100, 10).unwrap();

        let checkpoint = ledger
            .engine
            .record_contribution(alice, id, token.id(), 40)
            .unwrap();
        assert_eq!(ledger.engine.ledger().amount_of(id, alice), 40);

        let foreign = TokenId::new();
        let plan = TransferPlan {
            transfers: vec![Transfer {
                token: foreign,
                to: alice,
                amount: 40,
            }],
        };
        assert_eq!(
            ledger.pay_out(&plan, checkpoint),
            Err(CrowdfundError::TokenNotAvailable { token: foreign })
        );
        assert_eq!(ledger.engine.ledger().amount_of(id, alice), 0);
        assert!(ledger.engine.ledger().token_totals(id).is_empty());
        assert_eq!(ledger.engine.campaign(id).unwrap().total_raised, 0);
    }
}
