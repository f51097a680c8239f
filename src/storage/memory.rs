//! In-memory storage implementation
//!
//! Thread-safe in-memory backend, used for tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{LedgerStorage, StorageStats};
use crate::error::LedgerResult;
use crate::types::{ActorId, Campaign, CampaignId, Donation, DonationId, ModerationStatus};

/// In-memory ledger storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    campaigns: Arc<RwLock<HashMap<CampaignId, Campaign>>>,
    donations: Arc<RwLock<HashMap<DonationId, Donation>>>,
    // Index: campaign id -> donation ids in arrival order
    campaign_donations: Arc<RwLock<HashMap<CampaignId, Vec<DonationId>>>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all data
    pub async fn clear(&self) {
        self.campaigns.write().await.clear();
        self.donations.write().await.clear();
        self.campaign_donations.write().await.clear();
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    // ==================== Campaign operations ====================

    async fn save_campaign(&self, campaign: &Campaign) -> LedgerResult<()> {
        let mut campaigns = self.campaigns.write().await;
        campaigns.insert(campaign.id.clone(), campaign.clone());
        Ok(())
    }

    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>> {
        let campaigns = self.campaigns.read().await;
        Ok(campaigns.get(id).cloned())
    }

    async fn list_campaigns(&self) -> LedgerResult<Vec<Campaign>> {
        let campaigns = self.campaigns.read().await;
        let mut all: Vec<Campaign> = campaigns.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn list_campaigns_by_status(
        &self,
        status: ModerationStatus,
    ) -> LedgerResult<Vec<Campaign>> {
        let campaigns = self.campaigns.read().await;
        let mut matching: Vec<Campaign> = campaigns
            .values()
            .filter(|c| c.moderation_status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }

    async fn list_campaigns_by_owner(&self, owner: &ActorId) -> LedgerResult<Vec<Campaign>> {
        let campaigns = self.campaigns.read().await;
        let mut matching: Vec<Campaign> = campaigns
            .values()
            .filter(|c| &c.owner == owner)
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }

    // ==================== Donation operations ====================

    async fn get_donation(&self, id: &DonationId) -> LedgerResult<Option<Donation>> {
        let donations = self.donations.read().await;
        Ok(donations.get(id).cloned())
    }

    async fn list_donations(&self, campaign_id: &CampaignId) -> LedgerResult<Vec<Donation>> {
        let index = self.campaign_donations.read().await;
        let Some(ids) = index.get(campaign_id) else {
            return Ok(Vec::new());
        };
        let donations = self.donations.read().await;
        let mut entries: Vec<Donation> = ids
            .iter()
            .filter_map(|id| donations.get(id).cloned())
            .collect();
        entries.sort_by_key(|d| d.seq);
        Ok(entries)
    }

    async fn list_donations_by_donor(
        &self,
        campaign_id: &CampaignId,
        donor: &ActorId,
    ) -> LedgerResult<Vec<Donation>> {
        let entries = self.list_donations(campaign_id).await?;
        Ok(entries.into_iter().filter(|d| &d.donor == donor).collect())
    }

    // ==================== Combined commit ====================

    async fn commit_campaign_with_donations(
        &self,
        campaign: &Campaign,
        entries: &[Donation],
    ) -> LedgerResult<()> {
        // Take all write guards up front so the commit is observed whole.
        let mut campaigns = self.campaigns.write().await;
        let mut donations = self.donations.write().await;
        let mut index = self.campaign_donations.write().await;

        campaigns.insert(campaign.id.clone(), campaign.clone());

        let campaign_index = index.entry(campaign.id.clone()).or_default();
        for entry in entries {
            if !campaign_index.contains(&entry.id) {
                campaign_index.push(entry.id.clone());
            }
            donations.insert(entry.id.clone(), entry.clone());
        }

        Ok(())
    }

    // ==================== Statistics ====================

    async fn get_stats(&self) -> LedgerResult<StorageStats> {
        let campaigns = self.campaigns.read().await;
        let donations = self.donations.read().await;

        let pending_campaigns = campaigns
            .values()
            .filter(|c| c.moderation_status == ModerationStatus::Pending)
            .count() as u64;
        let approved_campaigns = campaigns
            .values()
            .filter(|c| c.moderation_status == ModerationStatus::Approved)
            .count() as u64;
        let blocked_campaigns = campaigns
            .values()
            .filter(|c| c.moderation_status == ModerationStatus::Blocked)
            .count() as u64;
        let voided_donations = donations.values().filter(|d| d.voided).count() as u64;
        let total_raised = campaigns.values().map(|c| c.amount_raised).sum();

        Ok(StorageStats {
            total_campaigns: campaigns.len() as u64,
            pending_campaigns,
            approved_campaigns,
            blocked_campaigns,
            total_donations: donations.len() as u64,
            voided_donations,
            total_raised,
        })
    }
}
