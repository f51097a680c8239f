//! Moderation operations
//!
//! Admin-only transitions between moderation states. Approving makes a
//! campaign's lifecycle Active; blocking freezes it terminally, at any point
//! before settlement. Retrying a moderation action after success fails with
//! `InvalidState` rather than silently applying twice.

use tracing::{info, warn};

use super::CampaignOps;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::LedgerStorage;
use crate::types::{Actor, Campaign, CampaignId};

fn require_admin(actor: &Actor, action: &str) -> LedgerResult<()> {
    if !actor.role.is_admin() {
        warn!(actor = %actor.id, action, "non-admin attempted moderation action");
        return Err(LedgerError::Unauthorized(format!(
            "{} requires the admin role",
            action
        )));
    }
    Ok(())
}

/// Approve a pending campaign
pub async fn approve<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    actor: &Actor,
) -> LedgerResult<Campaign> {
    require_admin(actor, "approve")?;

    let mut campaign = ops.load_campaign(campaign_id).await?;
    campaign.approve()?;
    ops.storage().save_campaign(&campaign).await?;

    info!(campaign_id = %campaign.id, admin = %actor.id, "campaign approved");
    Ok(campaign)
}

/// Block a pending or approved campaign
///
/// Blocking an already-funded campaign is allowed and freezes it: donations
/// and settlement both reject from then on.
pub async fn block<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    actor: &Actor,
    reason: String,
) -> LedgerResult<Campaign> {
    require_admin(actor, "block")?;

    let mut campaign = ops.load_campaign(campaign_id).await?;
    campaign.block(reason.clone())?;
    ops.storage().save_campaign(&campaign).await?;

    info!(
        campaign_id = %campaign.id,
        admin = %actor.id,
        reason = %reason,
        "campaign blocked"
    );
    Ok(campaign)
}
