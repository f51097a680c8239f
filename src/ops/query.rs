//! Read-only projections
//!
//! Campaign views recompute the lifecycle classification on every read; the
//! lifecycle is only exposed for Approved campaigns. Donation listings return
//! the raw ledger entries, voided included, for audit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CampaignOps;
use crate::error::LedgerResult;
use crate::outcome::{self, LifecycleStatus};
use crate::storage::LedgerStorage;
use crate::types::{
    ActorId, Campaign, CampaignId, Donation, ModerationStatus, PayoutAddress, Timestamp,
};

/// Public projection of a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignView {
    pub id: CampaignId,
    pub owner: ActorId,
    pub receiver: PayoutAddress,
    pub title: String,
    pub description: String,
    pub target: Decimal,
    pub deadline: Timestamp,
    pub created_at: Timestamp,
    pub amount_raised: Decimal,
    pub donor_count: u64,
    pub moderation_status: ModerationStatus,
    pub block_reason: Option<String>,
    /// Funding outcome; only defined while the campaign is Approved
    pub lifecycle: Option<LifecycleStatus>,
    pub withdrawn: bool,
}

impl CampaignView {
    /// Project a campaign at `now`
    pub fn project(campaign: Campaign, now: Timestamp) -> Self {
        let lifecycle = match campaign.moderation_status {
            ModerationStatus::Approved => Some(outcome::resolve_campaign(&campaign, now)),
            ModerationStatus::Pending | ModerationStatus::Blocked => None,
        };
        Self {
            id: campaign.id,
            owner: campaign.owner,
            receiver: campaign.receiver,
            title: campaign.title,
            description: campaign.description,
            target: campaign.target,
            deadline: campaign.deadline,
            created_at: campaign.created_at,
            amount_raised: campaign.amount_raised,
            donor_count: campaign.donor_count,
            moderation_status: campaign.moderation_status,
            block_reason: campaign.block_reason,
            lifecycle,
            withdrawn: campaign.withdrawn,
        }
    }
}

/// Campaign listing filter
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    /// Restrict to one moderation state
    pub moderation_status: Option<ModerationStatus>,
    /// Restrict to campaigns created by one owner
    pub owner: Option<ActorId>,
}

impl CampaignFilter {
    /// All campaigns
    pub fn all() -> Self {
        Self::default()
    }

    /// Campaigns in a given moderation state
    pub fn by_status(status: ModerationStatus) -> Self {
        Self {
            moderation_status: Some(status),
            ..Self::default()
        }
    }

    /// Campaigns created by one owner
    pub fn by_owner(owner: ActorId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }
}

/// Platform-wide moderation and funding counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_campaigns: u64,
    pub pending_campaigns: u64,
    pub approved_campaigns: u64,
    pub blocked_campaigns: u64,
    pub total_donations: u64,
    pub voided_donations: u64,
    pub total_raised: Decimal,
}

pub async fn get_campaign<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    now: Timestamp,
) -> LedgerResult<CampaignView> {
    let campaign = ops.load_campaign(campaign_id).await?;
    Ok(CampaignView::project(campaign, now))
}

pub async fn list_campaigns<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    filter: CampaignFilter,
    now: Timestamp,
) -> LedgerResult<Vec<CampaignView>> {
    let campaigns = match (&filter.moderation_status, &filter.owner) {
        (Some(status), _) => ops.storage().list_campaigns_by_status(*status).await?,
        (None, Some(owner)) => ops.storage().list_campaigns_by_owner(owner).await?,
        (None, None) => ops.storage().list_campaigns().await?,
    };

    Ok(campaigns
        .into_iter()
        .filter(|c| filter.owner.as_ref().map_or(true, |o| &c.owner == o))
        .map(|c| CampaignView::project(c, now))
        .collect())
}

pub async fn get_donations<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
) -> LedgerResult<Vec<Donation>> {
    // Surface CampaignNotFound for unknown ids rather than an empty ledger
    ops.load_campaign(campaign_id).await?;
    ops.storage().list_donations(campaign_id).await
}

pub async fn get_donations_by_donor<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    donor: &ActorId,
) -> LedgerResult<Vec<Donation>> {
    ops.load_campaign(campaign_id).await?;
    ops.storage().list_donations_by_donor(campaign_id, donor).await
}

pub async fn platform_stats<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
) -> LedgerResult<PlatformStats> {
    let stats = ops.storage().get_stats().await?;
    Ok(PlatformStats {
        total_campaigns: stats.total_campaigns,
        pending_campaigns: stats.pending_campaigns,
        approved_campaigns: stats.approved_campaigns,
        blocked_campaigns: stats.blocked_campaigns,
        total_donations: stats.total_donations,
        voided_donations: stats.voided_donations,
        total_raised: stats.total_raised,
    })
}
