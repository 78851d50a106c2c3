//! Contribution Ledger: who pledged what to which campaign
//!
//! Each (campaign, contributor) entry keeps the token-agnostic sum that
//! readers see, plus the per-token breakdown needed to return exactly the
//! tokens that were deposited. Per-(campaign, token) totals say how much of
//! each token the creator collects on withdrawal.
//!
//! Amounts of different tokens are added as raw numbers; the sum does not
//! account for denominations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use types::errors::CrowdfundError;
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::Amount;

/// A contributor's active pledge to one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Sum across all tokens.
    pub amount: Amount,
    /// Per-token amounts deposited.
    pub by_token: BTreeMap<TokenId, Amount>,
}

/// Owner of every (campaign, contributor) entry.
#[derive(Debug, Clone, Default)]
pub struct ContributionLedger {
    entries: HashMap<(CampaignId, AccountId), Contribution>,
    token_totals: HashMap<CampaignId, BTreeMap<TokenId, Amount>>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token-agnostic amount pledged; zero when there is no entry.
    pub fn amount_of(&self, id: CampaignId, contributor: AccountId) -> Amount {
        self.entries
            .get(&(id, contributor))
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    pub fn entry(&self, id: CampaignId, contributor: AccountId) -> Option<&Contribution> {
        self.entries.get(&(id, contributor))
    }

    /// Per-token totals currently held for a campaign.
    pub fn token_totals(&self, id: CampaignId) -> BTreeMap<TokenId, Amount> {
        self.token_totals.get(&id).cloned().unwrap_or_default()
    }

    /// Sum of all entries for a campaign.
    pub fn sum_for(&self, id: CampaignId) -> Amount {
        self.entries
            .iter()
            .filter(|((cid, _), _)| *cid == id)
            .map(|(_, c)| c.amount)
            .sum()
    }

    /// Contributors with an active entry for a campaign.
    pub fn contributors(&self, id: CampaignId) -> Vec<AccountId> {
        let mut contributors: Vec<AccountId> = self
            .entries
            .keys()
            .filter(|(cid, _)| *cid == id)
            .map(|(_, who)| *who)
            .collect();
        contributors.sort();
        contributors
    }

    /// Add `amount` of `token` to a contributor's entry.
    ///
    /// All sums are checked before anything is written.
    pub fn credit(
        &mut self,
        id: CampaignId,
        contributor: AccountId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), CrowdfundError> {
        let current = self.entries.get(&(id, contributor));
        let new_amount = current
            .map(|c| c.amount)
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;
        let new_token_amount = current
            .and_then(|c| c.by_token.get(&token).copied())
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;
        let new_token_total = self
            .token_totals
            .get(&id)
            .and_then(|totals| totals.get(&token).copied())
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;

        let entry = self.entries.entry((id, contributor)).or_default();
        entry.amount = new_amount;
        entry.by_token.insert(token, new_token_amount);
        self.token_totals
            .entry(id)
            .or_default()
            .insert(token, new_token_total);
        Ok(())
    }

    /// Remove a contributor's entry, releasing its tokens from the campaign totals.
    pub fn take(&mut self, id: CampaignId, contributor: AccountId) -> Option<Contribution> {
        let contribution = self.entries.remove(&(id, contributor))?;
        if let Some(totals) = self.token_totals.get_mut(&id) {
            for (token, amount) in &contribution.by_token {
                if let Some(total) = totals.get_mut(token) {
                    *total = total.saturating_sub(*amount);
                }
            }
            totals.retain(|_, total| *total > 0);
        }
        Some(contribution)
    }

    /// Put back a previously observed entry and campaign totals verbatim.
    pub fn restore(
        &mut self,
        id: CampaignId,
        contributor: AccountId,
        entry: Option<Contribution>,
        token_totals: BTreeMap<TokenId, Amount>,
    ) {
        match entry {
            Some(contribution) => {
                self.entries.insert((id, contributor), contribution);
            }
            None => {
                self.entries.remove(&(id, contributor));
            }
        }
        if token_totals.is_empty() {
            self.token_totals.remove(&id);
        } else {
            self.token_totals.insert(id, token_totals);
        }
    }
}
