//! Campaign operation loop
//!
//! Implements the funding lifecycle:
//! ```text
//! Create -> Moderate (approve | block) -> Donate* -> Settle (withdraw | refund)
//! ```
//!
//! Every mutating operation is a read-validate-write transaction executed
//! under the campaign's lock, so per-campaign mutations are linearizable and
//! any error leaves the ledger unchanged. Cross-campaign operations never
//! contend with each other.

pub mod create;
pub mod donate;
pub mod moderate;
pub mod query;
pub mod settle;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::payout::{LogPayout, PayoutSink};
use crate::storage::LedgerStorage;
use crate::types::{Actor, ActorId, Campaign, CampaignDraft, CampaignId, Donation, Timestamp};

pub use query::{CampaignFilter, CampaignView, PlatformStats};

/// Campaign operation executor
///
/// Owns the storage handle, the payout seam, and the per-campaign lock
/// registry that serializes mutations.
pub struct CampaignOps<S: LedgerStorage> {
    storage: Arc<S>,
    payout: Arc<dyn PayoutSink>,
    config: EngineConfig,
    // Per-campaign mutation locks; entries live as long as the process.
    // One entry per campaign touched, and the ledger is append-only, so the
    // registry grows no faster than the campaign set itself.
    locks: Mutex<HashMap<CampaignId, Arc<Mutex<()>>>>,
}

impl<S: LedgerStorage + 'static> CampaignOps<S> {
    /// Create an executor with the default logging payout sink
    pub fn new(storage: Arc<S>, config: EngineConfig) -> Self {
        Self::with_payout_sink(storage, config, Arc::new(LogPayout))
    }

    /// Create an executor with a custom payout sink
    pub fn with_payout_sink(
        storage: Arc<S>,
        config: EngineConfig,
        payout: Arc<dyn PayoutSink>,
    ) -> Self {
        Self {
            storage,
            payout,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub(crate) fn payout(&self) -> &Arc<dyn PayoutSink> {
        &self.payout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch the mutation lock for one campaign
    async fn campaign_lock(&self, id: &CampaignId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load a campaign or fail with `CampaignNotFound`
    pub(crate) async fn load_campaign(&self, id: &CampaignId) -> LedgerResult<Campaign> {
        self.storage
            .get_campaign(id)
            .await?
            .ok_or_else(|| LedgerError::CampaignNotFound(id.to_string()))
    }

    // ==================== Mutating operations ====================

    /// Create a new campaign in the Pending moderation state
    pub async fn create_campaign(
        &self,
        actor: &Actor,
        draft: CampaignDraft,
    ) -> LedgerResult<Campaign> {
        create::execute(self, actor, draft, Timestamp::now()).await
    }

    /// Admin approval: Pending -> Approved, lifecycle becomes Active
    pub async fn approve_campaign(
        &self,
        campaign_id: &CampaignId,
        actor: &Actor,
    ) -> LedgerResult<Campaign> {
        let lock = self.campaign_lock(campaign_id).await;
        let _guard = lock.lock().await;
        moderate::approve(self, campaign_id, actor).await
    }

    /// Admin block: Pending|Approved -> Blocked; freezes the campaign
    pub async fn block_campaign(
        &self,
        campaign_id: &CampaignId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> LedgerResult<Campaign> {
        let lock = self.campaign_lock(campaign_id).await;
        let _guard = lock.lock().await;
        moderate::block(self, campaign_id, actor, reason.into()).await
    }

    /// Record a donation against an active campaign
    pub async fn donate(
        &self,
        campaign_id: &CampaignId,
        donor: &Actor,
        amount: rust_decimal::Decimal,
    ) -> LedgerResult<Campaign> {
        let lock = self.campaign_lock(campaign_id).await;
        let _guard = lock.lock().await;
        donate::execute(self, campaign_id, donor, amount, Timestamp::now()).await
    }

    /// Owner withdrawal of a completed campaign's raised amount
    pub async fn withdraw(
        &self,
        campaign_id: &CampaignId,
        actor: &Actor,
    ) -> LedgerResult<Campaign> {
        let lock = self.campaign_lock(campaign_id).await;
        let _guard = lock.lock().await;
        settle::withdraw(self, campaign_id, actor, Timestamp::now()).await
    }

    /// Donor refund on a failed campaign; voids the donor's donations
    pub async fn refund(&self, campaign_id: &CampaignId, actor: &Actor) -> LedgerResult<Campaign> {
        let lock = self.campaign_lock(campaign_id).await;
        let _guard = lock.lock().await;
        settle::refund(self, campaign_id, actor, Timestamp::now()).await
    }

    // ==================== Read operations ====================

    /// Public projection of one campaign
    pub async fn get_campaign(&self, campaign_id: &CampaignId) -> LedgerResult<CampaignView> {
        query::get_campaign(self, campaign_id, Timestamp::now()).await
    }

    /// Public projections of campaigns matching a filter
    pub async fn list_campaigns(&self, filter: CampaignFilter) -> LedgerResult<Vec<CampaignView>> {
        query::list_campaigns(self, filter, Timestamp::now()).await
    }

    /// A campaign's donation ledger, ordered by sequence
    pub async fn get_donations(&self, campaign_id: &CampaignId) -> LedgerResult<Vec<Donation>> {
        query::get_donations(self, campaign_id).await
    }

    /// One donor's donations on a campaign
    pub async fn get_donations_by_donor(
        &self,
        campaign_id: &CampaignId,
        donor: &ActorId,
    ) -> LedgerResult<Vec<Donation>> {
        query::get_donations_by_donor(self, campaign_id, donor).await
    }

    /// Platform-wide moderation and funding counters
    pub async fn platform_stats(&self) -> LedgerResult<PlatformStats> {
        query::platform_stats(self).await
    }
}
