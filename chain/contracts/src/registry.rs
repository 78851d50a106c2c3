//! Campaign Registry: sequential campaign storage
//!
//! Campaigns live in a table indexed by id. Slot 0 always holds the sentinel,
//! so the next id to assign is simply the table length.

use types::campaign::Campaign;
use types::errors::CrowdfundError;
use types::ids::CampaignId;

/// Owner of all campaign records.
#[derive(Debug, Clone)]
pub struct CampaignRegistry {
    campaigns: Vec<Campaign>,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self {
            campaigns: vec![Campaign::sentinel()],
        }
    }

    /// Store a campaign under the next sequential id.
    pub fn register(&mut self, campaign: Campaign) -> CampaignId {
        let id = CampaignId::new(self.campaigns.len() as u64);
        self.campaigns.push(campaign);
        id
    }

    /// Look up a real campaign; the sentinel and unassigned ids are not found.
    pub fn get(&self, id: CampaignId) -> Result<&Campaign, CrowdfundError> {
        if id.is_sentinel() {
            return Err(CrowdfundError::CampaignNotFound { id });
        }
        self.campaigns
            .get(id.index())
            .ok_or(CrowdfundError::CampaignNotFound { id })
    }

    pub fn get_mut(&mut self, id: CampaignId) -> Result<&mut Campaign, CrowdfundError> {
        if id.is_sentinel() {
            return Err(CrowdfundError::CampaignNotFound { id });
        }
        self.campaigns
            .get_mut(id.index())
            .ok_or(CrowdfundError::CampaignNotFound { id })
    }

    /// All records, sentinel first.
    pub fn all(&self) -> &[Campaign] {
        &self.campaigns
    }

    /// Highest id assigned so far (0 when empty).
    pub fn last_id(&self) -> CampaignId {
        CampaignId::new(self.campaigns.len() as u64 - 1)
    }

    /// Ids of every real campaign in creation order.
    pub fn ids(&self) -> impl Iterator<Item = CampaignId> {
        (1..self.campaigns.len() as u64).map(CampaignId::new)
    }
}

impl Default for CampaignRegistry {
    fn default() -> Self {
        Self::new()
    }
}
