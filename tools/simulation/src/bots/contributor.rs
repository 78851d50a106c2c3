//! Contributor bot
//!
//! Picks a campaign uniformly among every id assigned so far, the sentinel
//! included, so the not-found path is exercised alongside the happy ones.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use types::ids::{AccountId, CampaignId};
use types::numeric::Amount;

use crate::config::Bounds;

/// Share of pledges made in a token outside the accepted set.
const UNLISTED_TOKEN_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPick {
    /// Index into the ledger's accepted tokens
    Listed(usize),
    Unlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorAction {
    Contribute {
        campaign: CampaignId,
        token: TokenPick,
        amount: Amount,
    },
    Cancel {
        campaign: CampaignId,
    },
    Refund {
        campaign: CampaignId,
    },
}

pub struct ContributorBot {
    pub account: AccountId,
    pub actions_taken: usize,
    amount: Bounds<Amount>,
    rng: ChaCha8Rng,
}

impl ContributorBot {
    pub fn new(account: AccountId, amount: Bounds<Amount>, seed: u64) -> Self {
        Self {
            account,
            actions_taken: 0,
            amount,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next action against campaigns `0..=last`, with `tokens` accepted tokens.
    pub fn next_action(&mut self, last: CampaignId, tokens: usize) -> ContributorAction {
        let campaign = CampaignId::new(self.rng.gen_range(0..=last.get()));
        let roll: u32 = self.rng.gen_range(0..100);
        self.actions_taken += 1;

        match roll {
            0..=69 => {
                let token = if tokens == 0 || self.rng.gen_bool(UNLISTED_TOKEN_RATIO) {
                    TokenPick::Unlisted
                } else {
                    TokenPick::Listed(self.rng.gen_range(0..tokens))
                };
                let amount = self.rng.gen_range(self.amount.min..=self.amount.max);
                ContributorAction::Contribute {
                    campaign,
                    token,
                    amount,
                }
            }
            70..=84 => ContributorAction::Cancel { campaign },
            _ => ContributorAction::Refund { campaign },
        }
    }
}
