//! Settlement Engine: campaign state-transition rules
//!
//! The engine owns the registry and the contribution ledger and decides every
//! transition. Each mutating rule validates all of its preconditions first,
//! then commits its effects, and finally hands back the token movements the
//! caller must perform. Nothing here talks to a token gateway: the caller
//! executes the returned `TransferPlan` after the engine state is final, and
//! restores the returned `Checkpoint` if that execution fails.

use std::collections::BTreeMap;
use types::campaign::Campaign;
use types::errors::CrowdfundError;
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::{Amount, Duration, Timestamp};

use crate::config::LedgerConfig;
use crate::events::ContractEvent;
use crate::ledger::{Contribution, ContributionLedger};
use crate::registry::CampaignRegistry;

/// One outgoing token movement from custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub token: TokenId,
    pub to: AccountId,
    pub amount: Amount,
}

/// Outgoing movements of one settlement, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub transfers: Vec<Transfer>,
}

impl TransferPlan {
    fn pay_out(to: AccountId, amounts: &BTreeMap<TokenId, Amount>) -> Self {
        Self {
            transfers: amounts
                .iter()
                .filter(|(_, amount)| **amount > 0)
                .map(|(token, amount)| Transfer {
                    token: *token,
                    to,
                    amount: *amount,
                })
                .collect(),
        }
    }

    /// Raw sum of every movement.
    pub fn total(&self) -> Amount {
        self.transfers
            .iter()
            .fold(0, |acc: Amount, t| acc.saturating_add(t.amount))
    }
}

/// Engine state touched by one operation, captured before its effects.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    id: CampaignId,
    campaign: Campaign,
    account: AccountId,
    entry: Option<Contribution>,
    token_totals: BTreeMap<TokenId, Amount>,
}

/// Shared campaign/contribution rules behind both ledger variants.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    registry: CampaignRegistry,
    ledger: ContributionLedger,
    config: LedgerConfig,
    events: Vec<ContractEvent>,
}

impl SettlementEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            registry: CampaignRegistry::new(),
            ledger: ContributionLedger::new(),
            config,
            events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &CampaignRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &ContributionLedger {
        &self.ledger
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ───────────────────────── Registry ─────────────────────────

    /// Open a campaign owned by `creator` ending `duration` seconds after `now`.
    pub fn create_campaign(
        &mut self,
        creator: AccountId,
        goal: Amount,
        duration: Duration,
        now: Timestamp,
    ) -> Result<CampaignId, CrowdfundError> {
        if goal == 0 {
            return Err(CrowdfundError::ZeroGoal);
        }
        if duration == 0 {
            return Err(CrowdfundError::ZeroDuration);
        }
        if let Some(max) = self.config.max_campaign_duration {
            if duration > max {
                return Err(CrowdfundError::DurationTooLong { max });
            }
        }
        let deadline = now.checked_add(duration).ok_or(CrowdfundError::Overflow)?;

        Ok(self
            .registry
            .register(Campaign::new(goal, deadline, creator)))
    }

    pub fn campaign(&self, id: CampaignId) -> Result<&Campaign, CrowdfundError> {
        self.registry.get(id)
    }

    // ───────────────────────── Contributions ─────────────────────────

    /// Preconditions of a pledge that do not depend on the accepted token set
    /// or the caller.
    ///
    /// Order: campaign exists, campaign still running, token non-null,
    /// amount non-zero.
    pub fn check_open_for(
        &self,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), CrowdfundError> {
        let campaign = self.registry.get(id)?;
        if campaign.is_expired(now) {
            return Err(CrowdfundError::CampaignEnded {
                deadline: campaign.deadline,
            });
        }
        if token.is_zero() {
            return Err(CrowdfundError::ZeroAddress);
        }
        if amount == 0 {
            return Err(CrowdfundError::ZeroContribution);
        }
        Ok(())
    }

    /// Record a pledge whose campaign, timing and amount were already checked.
    ///
    /// Rejects the campaign's own creator, then credits the ledger entry and
    /// the campaign total together.
    pub fn record_contribution(
        &mut self,
        contributor: AccountId,
        id: CampaignId,
        token: TokenId,
        amount: Amount,
    ) -> Result<Checkpoint, CrowdfundError> {
        let campaign = self.registry.get(id)?;
        if campaign.creator == contributor {
            return Err(CrowdfundError::ContributeByCreator);
        }
        let total_raised = campaign
            .total_raised
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;

        let checkpoint = self.checkpoint(id, contributor)?;
        self.ledger.credit(id, contributor, token, amount)?;
        self.registry.get_mut(id)?.total_raised = total_raised;
        Ok(checkpoint)
    }

    /// Withdraw a pledge before the deadline.
    pub fn cancel_contribution(
        &mut self,
        contributor: AccountId,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<(TransferPlan, Checkpoint), CrowdfundError> {
        let campaign = self.registry.get(id)?;
        if campaign.is_expired(now) {
            return Err(CrowdfundError::CampaignEnded {
                deadline: campaign.deadline,
            });
        }
        self.release_contribution(contributor, id)
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Mark a successful campaign withdrawn and pay every token total to its creator.
    pub fn withdraw_funds(
        &mut self,
        caller: AccountId,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<(TransferPlan, Checkpoint), CrowdfundError> {
        let campaign = self.registry.get(id)?;
        if campaign.creator != caller {
            return Err(CrowdfundError::NotCampaignCreator {
                creator: campaign.creator,
            });
        }
        if !campaign.is_expired(now) {
            return Err(CrowdfundError::CampaignNotEnded {
                deadline: campaign.deadline,
            });
        }
        if !campaign.goal_reached() {
            return Err(CrowdfundError::CampaignGoalNotReached {
                goal: campaign.goal,
                total_raised: campaign.total_raised,
            });
        }
        if campaign.withdrawn {
            return Err(CrowdfundError::AlreadyWithdrawn);
        }

        let checkpoint = self.checkpoint(id, caller)?;
        // Totals and entries stay as the historical record.
        self.registry.get_mut(id)?.withdrawn = true;
        let plan = TransferPlan::pay_out(caller, &self.ledger.token_totals(id));
        Ok((plan, checkpoint))
    }

    /// Return a contributor's pledge from a campaign that missed its goal.
    pub fn refund(
        &mut self,
        contributor: AccountId,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<(TransferPlan, Checkpoint), CrowdfundError> {
        let campaign = self.registry.get(id)?;
        if !campaign.is_expired(now) {
            return Err(CrowdfundError::CampaignNotEnded {
                deadline: campaign.deadline,
            });
        }
        if campaign.withdrawn {
            return Err(CrowdfundError::AlreadyWithdrawn);
        }
        if self.ledger.amount_of(id, contributor) == 0 {
            return Err(CrowdfundError::ZeroContributions);
        }
        if campaign.goal_reached() {
            return Err(CrowdfundError::CampaignGoalReached {
                goal: campaign.goal,
                total_raised: campaign.total_raised,
            });
        }
        self.release_contribution(contributor, id)
    }

    /// Zero a contributor's entry and take it out of the campaign total.
    fn release_contribution(
        &mut self,
        contributor: AccountId,
        id: CampaignId,
    ) -> Result<(TransferPlan, Checkpoint), CrowdfundError> {
        let amount = self.ledger.amount_of(id, contributor);
        if amount == 0 {
            return Err(CrowdfundError::ZeroContributions);
        }
        let total_raised = self
            .registry
            .get(id)?
            .total_raised
            .checked_sub(amount)
            .ok_or(CrowdfundError::Overflow)?;

        let checkpoint = self.checkpoint(id, contributor)?;
        let released = self.ledger.take(id, contributor).unwrap_or_default();
        self.registry.get_mut(id)?.total_raised = total_raised;
        Ok((TransferPlan::pay_out(contributor, &released.by_token), checkpoint))
    }

    // ───────────────────────── Rollback ─────────────────────────

    fn checkpoint(&self, id: CampaignId, account: AccountId) -> Result<Checkpoint, CrowdfundError> {
        Ok(Checkpoint {
            id,
            campaign: self.registry.get(id)?.clone(),
            account,
            entry: self.ledger.entry(id, account).cloned(),
            token_totals: self.ledger.token_totals(id),
        })
    }

    /// Undo the effects committed since `checkpoint` was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        let Checkpoint {
            id,
            campaign,
            account,
            entry,
            token_totals,
        } = checkpoint;
        if let Ok(slot) = self.registry.get_mut(id) {
            *slot = campaign;
        }
        self.ledger.restore(id, account, entry, token_totals);
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn emit(&mut self, event: ContractEvent) {
        if self.config.record_events {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
