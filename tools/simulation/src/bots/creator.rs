//! Campaign creator bot

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use types::ids::{AccountId, CampaignId};
use types::numeric::{Amount, Duration};

use crate::config::Bounds;

pub struct CreatorBot {
    pub account: AccountId,
    /// Campaigns this creator opened, oldest first
    pub campaigns: Vec<CampaignId>,
    goal: Bounds<Amount>,
    duration: Bounds<Duration>,
    rng: ChaCha8Rng,
}

impl CreatorBot {
    pub fn new(
        account: AccountId,
        goal: Bounds<Amount>,
        duration: Bounds<Duration>,
        seed: u64,
    ) -> Self {
        Self {
            account,
            campaigns: Vec::new(),
            goal,
            duration,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Goal and duration for a new campaign.
    pub fn propose(&mut self) -> (Amount, Duration) {
        let goal = self.rng.gen_range(self.goal.min..=self.goal.max);
        let duration = self.rng.gen_range(self.duration.min..=self.duration.max);
        (goal, duration)
    }

    pub fn adopt(&mut self, id: CampaignId) {
        self.campaigns.push(id);
    }

    /// One of this creator's campaigns to try withdrawing from.
    pub fn pick_withdrawal(&mut self) -> Option<CampaignId> {
        self.campaigns.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposals_within_bounds() {
        let mut bot = CreatorBot::new(AccountId::new(), Bounds::new(10, 20), Bounds::new(5, 6), 3);
        for _ in 0..100 {
            let (goal, duration) = bot.propose();
            assert!((10..=20).contains(&goal));
            assert!((5..=6).contains(&duration));
        }
    }

    #[test]
    fn test_withdrawal_picks_own_campaign() {
        let mut bot = CreatorBot::new(AccountId::new(), Bounds::new(1, 1), Bounds::new(1, 1), 3);
        assert_eq!(bot.pick_withdrawal(), None);
        bot.adopt(CampaignId::new(4));
        bot.adopt(CampaignId::new(9));
        for _ in 0..20 {
            let picked = bot.pick_withdrawal().unwrap();
            assert!(bot.campaigns.contains(&picked));
        }
    }
}
