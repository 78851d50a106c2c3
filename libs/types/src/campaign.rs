//! Campaign record and derived lifecycle state
//!
//! A campaign stores only what cannot be derived: goal, deadline, creator,
//! running total and the `withdrawn` flag. Everything else about its
//! lifecycle is computed from those fields and the current time.

use crate::ids::AccountId;
use crate::numeric::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a campaign at a given instant
///
/// `Active → ExpiredGoalMet | ExpiredGoalUnmet`, and `ExpiredGoalMet → Settled`
/// once the creator withdraws. No other transition exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignState {
    /// Deadline not reached; contributions and cancellations allowed
    Active,
    /// Deadline passed with the goal met; creator may withdraw
    ExpiredGoalMet,
    /// Deadline passed with the goal unmet; contributors may refund
    ExpiredGoalUnmet,
    /// Creator has withdrawn; terminal
    Settled,
}

/// One funding round
///
/// Invariant: `total_raised` equals the sum of the non-zero contribution
/// entries recorded for this campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub goal: Amount,
    pub deadline: Timestamp,
    pub creator: AccountId,
    pub total_raised: Amount,
    pub withdrawn: bool,
}

impl Campaign {
    /// Open a new campaign at zero raised.
    pub fn new(goal: Amount, deadline: Timestamp, creator: AccountId) -> Self {
        Self {
            goal,
            deadline,
            creator,
            total_raised: 0,
            withdrawn: false,
        }
    }

    /// The all-zero placeholder stored in slot 0.
    pub fn sentinel() -> Self {
        Self::new(0, 0, AccountId::ZERO)
    }

    /// Seconds until the deadline, clamped at zero.
    pub fn seconds_remaining(&self, now: Timestamp) -> u64 {
        self.deadline.saturating_sub(now)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }

    pub fn goal_reached(&self) -> bool {
        self.total_raised >= self.goal
    }

    /// Derive the lifecycle state at `now`.
    pub fn state(&self, now: Timestamp) -> CampaignState {
        if self.withdrawn {
            CampaignState::Settled
        } else if !self.is_expired(now) {
            CampaignState::Active
        } else if self.goal_reached() {
            CampaignState::ExpiredGoalMet
        } else {
            CampaignState::ExpiredGoalUnmet
        }
    }

    /// Read view returned by campaign lookup.
    pub fn summary(&self, now: Timestamp) -> CampaignSummary {
        CampaignSummary {
            seconds_remaining: self.seconds_remaining(now),
            goal: self.goal,
            total_raised: self.total_raised,
        }
    }
}

/// `(secondsRemaining, goal, totalRaised)` as seen by readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub seconds_remaining: u64,
    pub goal: Amount,
    pub total_raised: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(goal: Amount, deadline: Timestamp) -> Campaign {
        Campaign::new(goal, deadline, AccountId::new())
    }

    #[test]
    fn test_sentinel_is_all_zero() {
        let s = Campaign::sentinel();
        assert_eq!(s.goal, 0);
        assert_eq!(s.deadline, 0);
        assert!(s.creator.is_zero());
        assert_eq!(s.total_raised, 0);
        assert!(!s.withdrawn);
    }

    #[test]
    fn test_seconds_remaining_never_negative() {
        let c = campaign(100, 1_000);
        assert_eq!(c.seconds_remaining(900), 100);
        assert_eq!(c.seconds_remaining(1_000), 0);
        assert_eq!(c.seconds_remaining(5_000), 0);
    }

    #[test]
    fn test_state_transitions() {
        let mut c = campaign(100, 1_000);
        assert_eq!(c.state(999), CampaignState::Active);
        assert_eq!(c.state(1_000), CampaignState::ExpiredGoalUnmet);

        c.total_raised = 100;
        assert_eq!(c.state(1_000), CampaignState::ExpiredGoalMet);

        c.withdrawn = true;
        assert_eq!(c.state(1_000), CampaignState::Settled);
    }

    #[test]
    fn test_summary() {
        let mut c = campaign(100, 1_000);
        c.total_raised = 40;
        let summary = c.summary(400);
        assert_eq!(
            summary,
            CampaignSummary {
                seconds_remaining: 600,
                goal: 100,
                total_raised: 40,
            }
        );
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&CampaignState::ExpiredGoalMet).unwrap();
        assert_eq!(json, "\"EXPIRED_GOAL_MET\"");
    }
}
