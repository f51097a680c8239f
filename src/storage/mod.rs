//! Ledger storage layer
//!
//! Durable record of campaigns and their donations; the source of truth for
//! amounts. Records are append-or-update only: campaigns and donations are
//! never deleted, the full ledger persists for audit.
//!
//! Mutations that touch a campaign together with donation entries go through
//! [`LedgerStorage::commit_campaign_with_donations`], which each backend
//! implements as a single atomic unit so no partial aggregate update is ever
//! observable.

pub mod memory;
pub mod sled;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::LedgerResult;
use crate::types::{ActorId, Campaign, CampaignId, Donation, DonationId, ModerationStatus};

/// Ledger storage interface
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    // ==================== Campaign operations ====================

    /// Save or update a campaign record
    async fn save_campaign(&self, campaign: &Campaign) -> LedgerResult<()>;

    /// Fetch a campaign by id
    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>>;

    /// List all campaigns
    async fn list_campaigns(&self) -> LedgerResult<Vec<Campaign>>;

    /// List campaigns in a given moderation state
    async fn list_campaigns_by_status(
        &self,
        status: ModerationStatus,
    ) -> LedgerResult<Vec<Campaign>>;

    /// List campaigns created by a given owner
    async fn list_campaigns_by_owner(&self, owner: &ActorId) -> LedgerResult<Vec<Campaign>>;

    // ==================== Donation operations ====================

    /// Fetch a donation by id
    async fn get_donation(&self, id: &DonationId) -> LedgerResult<Option<Donation>>;

    /// List a campaign's donations, ordered by per-campaign sequence
    async fn list_donations(&self, campaign_id: &CampaignId) -> LedgerResult<Vec<Donation>>;

    /// List one donor's donations on a campaign, ordered by sequence
    async fn list_donations_by_donor(
        &self,
        campaign_id: &CampaignId,
        donor: &ActorId,
    ) -> LedgerResult<Vec<Donation>>;

    // ==================== Combined commit ====================

    /// Persist a campaign together with new or updated donation entries as
    /// one atomic unit. Used by donate (one new entry) and refund (the
    /// donor's entries flipped to voided) so the aggregates on the campaign
    /// record and the ledger entries can never diverge mid-write.
    async fn commit_campaign_with_donations(
        &self,
        campaign: &Campaign,
        donations: &[Donation],
    ) -> LedgerResult<()>;

    // ==================== Statistics ====================

    /// Platform-wide counters
    async fn get_stats(&self) -> LedgerResult<StorageStats>;
}

/// Storage statistics
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Campaign total
    pub total_campaigns: u64,
    /// Campaigns awaiting moderation
    pub pending_campaigns: u64,
    /// Approved campaigns
    pub approved_campaigns: u64,
    /// Blocked campaigns
    pub blocked_campaigns: u64,
    /// Donation entry total (voided entries included)
    pub total_donations: u64,
    /// Voided donation entries
    pub voided_donations: u64,
    /// Sum of `amount_raised` across all campaigns
    pub total_raised: Decimal,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the persistent backend
    pub data_dir: String,
    /// Cache size in bytes
    pub cache_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./campaign_data".to_string(),
            cache_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl StorageConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self {
            data_dir: "./campaign_dev_data".to_string(),
            cache_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

pub use self::sled::SledStorage;
pub use memory::MemoryStorage;
