//! Settlement engine
//!
//! Terminal payout paths: withdraw (owner, campaign Completed) and refund
//! (donor, campaign Failed). Each path is payable at most once per eligible
//! party; the ledger-side flag transition commits before the payout signal
//! is emitted, so no two settlement attempts can both pass the gate.
//!
//! Deployment policy: the campaign owner authorizes the withdrawal, and the
//! funds are always addressed to the campaign's receiver.

use rust_decimal::Decimal;
use tracing::info;

use super::CampaignOps;
use crate::error::{LedgerError, LedgerResult};
use crate::outcome::{self, LifecycleStatus};
use crate::payout::{PayoutDestination, PayoutKind, PayoutSignal};
use crate::storage::LedgerStorage;
use crate::types::{Actor, Campaign, CampaignId, ModerationStatus, Timestamp};

fn require_settleable(campaign: &Campaign) -> LedgerResult<()> {
    match campaign.moderation_status {
        ModerationStatus::Blocked => Err(LedgerError::CampaignBlocked(campaign.id.to_string())),
        ModerationStatus::Pending => Err(LedgerError::InvalidState(format!(
            "campaign {} was never approved",
            campaign.id
        ))),
        ModerationStatus::Approved => Ok(()),
    }
}

/// Withdraw a completed campaign's raised amount to its receiver
pub async fn withdraw<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    actor: &Actor,
    now: Timestamp,
) -> LedgerResult<Campaign> {
    let mut campaign = ops.load_campaign(campaign_id).await?;
    require_settleable(&campaign)?;

    if actor.id != campaign.owner {
        return Err(LedgerError::Unauthorized(format!(
            "only the campaign owner may withdraw, not {}",
            actor.id
        )));
    }

    let status = outcome::resolve_campaign(&campaign, now);
    if status != LifecycleStatus::Completed {
        return Err(LedgerError::InvalidState(format!(
            "campaign {} is {}, withdrawal requires completion",
            campaign_id, status
        )));
    }

    // Sole gate against double payout: flips false -> true exactly once
    campaign.mark_withdrawn(now)?;
    ops.storage().save_campaign(&campaign).await?;

    let amount = campaign.amount_raised;
    ops.payout()
        .signal(PayoutSignal {
            campaign_id: campaign.id.clone(),
            kind: PayoutKind::Withdrawal,
            destination: PayoutDestination::Address(campaign.receiver.clone()),
            amount,
            signaled_at: now,
        })
        .await?;

    info!(
        campaign_id = %campaign.id,
        receiver = %campaign.receiver,
        amount = %amount,
        "withdrawal settled"
    );

    Ok(campaign)
}

/// Refund a donor's live donations on a failed campaign
pub async fn refund<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    actor: &Actor,
    now: Timestamp,
) -> LedgerResult<Campaign> {
    let mut campaign = ops.load_campaign(campaign_id).await?;
    require_settleable(&campaign)?;

    let entries = ops
        .storage()
        .list_donations_by_donor(campaign_id, &actor.id)
        .await?;
    if entries.is_empty() {
        return Err(LedgerError::Unauthorized(format!(
            "{} holds no donation on campaign {}",
            actor.id, campaign_id
        )));
    }

    let status = outcome::resolve_campaign(&campaign, now);
    if status != LifecycleStatus::Failed {
        return Err(LedgerError::InvalidState(format!(
            "campaign {} is {}, refunds require failure",
            campaign_id, status
        )));
    }

    let mut voided = Vec::new();
    let mut refunded = Decimal::ZERO;
    for mut entry in entries {
        if entry.voided {
            continue;
        }
        entry.void(now)?;
        refunded += entry.amount;
        voided.push(entry);
    }
    if voided.is_empty() {
        return Err(LedgerError::AlreadyRefunded {
            campaign_id: campaign_id.to_string(),
            donor: actor.id.to_string(),
        });
    }

    // The explicit refund-void is the only path that lowers amount_raised
    campaign.amount_raised -= refunded;
    campaign.donor_count = campaign.donor_count.saturating_sub(1);

    ops.storage()
        .commit_campaign_with_donations(&campaign, &voided)
        .await?;

    ops.payout()
        .signal(PayoutSignal {
            campaign_id: campaign.id.clone(),
            kind: PayoutKind::Refund,
            destination: PayoutDestination::Donor(actor.id.clone()),
            amount: refunded,
            signaled_at: now,
        })
        .await?;

    info!(
        campaign_id = %campaign.id,
        donor = %actor.id,
        amount = %refunded,
        "refund settled"
    );

    Ok(campaign)
}
