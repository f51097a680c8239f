//! Sled persistent storage implementation
//!
//! Embedded-database backend. The combined campaign+donations commit runs as
//! a multi-tree sled transaction so aggregates and ledger entries land
//! together or not at all.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;

use super::{LedgerStorage, StorageConfig, StorageStats};
use crate::error::{LedgerError, LedgerResult};
use crate::types::{ActorId, Campaign, CampaignId, Donation, DonationId, ModerationStatus};

// Tree name constants
const CAMPAIGNS_TREE: &str = "campaigns";
const DONATIONS_TREE: &str = "donations";
const CAMPAIGN_DONATIONS_TREE: &str = "campaign_donations";

/// Sled-backed ledger storage
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: sled::Db,
    campaigns: sled::Tree,
    donations: sled::Tree,
    // Index: campaign id -> donation ids in arrival order
    campaign_donations: sled::Tree,
}

impl SledStorage {
    /// Create a new sled storage from configuration
    pub fn new(config: &StorageConfig) -> LedgerResult<Self> {
        let db = sled::Config::new()
            .path(&config.data_dir)
            .cache_capacity(config.cache_size)
            .open()
            .map_err(|e| LedgerError::Storage(format!("Failed to open sled db: {}", e)))?;
        Self::from_db(db)
    }

    /// Open or create a sled database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Storage(format!("Failed to open sled db: {}", e)))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> LedgerResult<Self> {
        let campaigns = db
            .open_tree(CAMPAIGNS_TREE)
            .map_err(|e| LedgerError::Storage(format!("Failed to open campaigns tree: {}", e)))?;
        let donations = db
            .open_tree(DONATIONS_TREE)
            .map_err(|e| LedgerError::Storage(format!("Failed to open donations tree: {}", e)))?;
        let campaign_donations = db.open_tree(CAMPAIGN_DONATIONS_TREE).map_err(|e| {
            LedgerError::Storage(format!("Failed to open campaign_donations tree: {}", e))
        })?;

        Ok(Self {
            db,
            campaigns,
            donations,
            campaign_donations,
        })
    }

    /// Flush to disk
    pub fn flush(&self) -> LedgerResult<()> {
        self.db
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush db: {}", e)))?;
        Ok(())
    }

    // ==================== Helpers ====================

    fn serialize<T: Serialize>(value: &T) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn donation_ids(&self, campaign_id: &CampaignId) -> LedgerResult<Vec<String>> {
        match self.campaign_donations.get(campaign_id.as_str().as_bytes())? {
            Some(raw) => Self::deserialize(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn campaigns_matching<F>(&self, predicate: F) -> LedgerResult<Vec<Campaign>>
    where
        F: Fn(&Campaign) -> bool,
    {
        let mut matching = Vec::new();
        for item in self.campaigns.iter() {
            let (_, raw) = item?;
            let campaign: Campaign = Self::deserialize(&raw)?;
            if predicate(&campaign) {
                matching.push(campaign);
            }
        }
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }
}

#[async_trait]
impl LedgerStorage for SledStorage {
    // ==================== Campaign operations ====================

    async fn save_campaign(&self, campaign: &Campaign) -> LedgerResult<()> {
        let bytes = Self::serialize(campaign)?;
        self.campaigns
            .insert(campaign.id.as_str().as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>> {
        match self.campaigns.get(id.as_str().as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_campaigns(&self) -> LedgerResult<Vec<Campaign>> {
        self.campaigns_matching(|_| true)
    }

    async fn list_campaigns_by_status(
        &self,
        status: ModerationStatus,
    ) -> LedgerResult<Vec<Campaign>> {
        self.campaigns_matching(|c| c.moderation_status == status)
    }

    async fn list_campaigns_by_owner(&self, owner: &ActorId) -> LedgerResult<Vec<Campaign>> {
        self.campaigns_matching(|c| &c.owner == owner)
    }

    // ==================== Donation operations ====================

    async fn get_donation(&self, id: &DonationId) -> LedgerResult<Option<Donation>> {
        match self.donations.get(id.as_str().as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_donations(&self, campaign_id: &CampaignId) -> LedgerResult<Vec<Donation>> {
        let ids = self.donation_ids(campaign_id)?;
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(raw) = self.donations.get(id.as_bytes())? {
                entries.push(Self::deserialize::<Donation>(&raw)?);
            }
        }
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
        let campaign_key = campaign.id.as_str().as_bytes().to_vec();
        let campaign_bytes = Self::serialize(campaign)?;
        let entry_bytes: Vec<(Vec<u8>, Vec<u8>)> = entries
            .iter()
            .map(|e| Ok((e.id.as_str().as_bytes().to_vec(), Self::serialize(e)?)))
            .collect::<LedgerResult<_>>()?;
        let entry_ids: Vec<String> = entries.iter().map(|e| e.id.0.clone()).collect();

        (&self.campaigns, &self.donations, &self.campaign_donations)
            .transaction(|(campaigns_t, donations_t, index_t)| {
                campaigns_t.insert(campaign_key.clone(), campaign_bytes.clone())?;

                for (key, bytes) in &entry_bytes {
                    donations_t.insert(key.clone(), bytes.clone())?;
                }

                let mut ids: Vec<String> = match index_t.get(campaign_key.clone())? {
                    Some(raw) => serde_json::from_slice(&raw).map_err(|e| {
                        ConflictableTransactionError::Abort(LedgerError::Serialization(
                            e.to_string(),
                        ))
                    })?,
                    None => Vec::new(),
                };
                for id in &entry_ids {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
                let index_bytes = serde_json::to_vec(&ids).map_err(|e| {
                    ConflictableTransactionError::Abort(LedgerError::Serialization(e.to_string()))
                })?;
                index_t.insert(campaign_key.clone(), index_bytes)?;

                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => LedgerError::Storage(err.to_string()),
            })?;

        Ok(())
    }

    // ==================== Statistics ====================

    async fn get_stats(&self) -> LedgerResult<StorageStats> {
        let mut stats = StorageStats::default();

        for item in self.campaigns.iter() {
            let (_, raw) = item?;
            let campaign: Campaign = Self::deserialize(&raw)?;
            stats.total_campaigns += 1;
            match campaign.moderation_status {
                ModerationStatus::Pending => stats.pending_campaigns += 1,
                ModerationStatus::Approved => stats.approved_campaigns += 1,
                ModerationStatus::Blocked => stats.blocked_campaigns += 1,
            }
            stats.total_raised += campaign.amount_raised;
        }

        for item in self.donations.iter() {
            let (_, raw) = item?;
            let donation: Donation = Self::deserialize(&raw)?;
            stats.total_donations += 1;
            if donation.voided {
                stats.voided_donations += 1;
            }
        }

        Ok(stats)
    }
}
