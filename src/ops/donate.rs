//! Donation engine
//!
//! Validates and applies a donation against a campaign, updating the
//! aggregates atomically with the appended ledger entry. Runs under the
//! campaign's mutation lock, so two donations racing past the target are
//! admitted in some serial order and judged one at a time.

use rust_decimal::Decimal;
use tracing::info;

use super::CampaignOps;
use crate::config::OverfundingPolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::outcome::{self, LifecycleStatus};
use crate::storage::LedgerStorage;
use crate::types::{Actor, Campaign, CampaignId, Donation, ModerationStatus, Timestamp};

/// Execute a donation
pub async fn execute<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    campaign_id: &CampaignId,
    donor: &Actor,
    amount: Decimal,
    now: Timestamp,
) -> LedgerResult<Campaign> {
    let mut campaign = ops.load_campaign(campaign_id).await?;

    match campaign.moderation_status {
        ModerationStatus::Blocked => {
            return Err(LedgerError::CampaignBlocked(campaign_id.to_string()));
        }
        ModerationStatus::Pending => {
            return Err(LedgerError::CampaignNotActive(format!(
                "campaign {} is awaiting moderation",
                campaign_id
            )));
        }
        ModerationStatus::Approved => {}
    }

    // A withdrawn campaign is settled; money recorded against it could never
    // be withdrawn again or refunded, so no policy admits it.
    if campaign.withdrawn {
        return Err(LedgerError::InvalidState(format!(
            "campaign {} is settled and closed to donations",
            campaign_id
        )));
    }

    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "donation must be positive, got {}",
            amount
        )));
    }

    let status = outcome::resolve_campaign(&campaign, now);
    let accepting = match ops.config().overfunding {
        // Reaching the target closes the campaign to further donations
        OverfundingPolicy::CloseAtTarget => status == LifecycleStatus::Active,
        // Donations run until the deadline regardless of amount raised
        OverfundingPolicy::AcceptUntilDeadline => now < campaign.deadline,
    };
    if !accepting {
        return Err(LedgerError::CampaignNotActive(format!(
            "campaign {} is {} and no longer accepting donations",
            campaign_id, status
        )));
    }

    let prior_entries = ops
        .storage()
        .list_donations_by_donor(campaign_id, &donor.id)
        .await?;
    let is_new_donor = !prior_entries.iter().any(|d| !d.voided);

    let seq = campaign.next_donation_seq();
    let donation = Donation::new(campaign_id.clone(), donor.id.clone(), amount, seq, now);

    campaign.amount_raised = campaign.amount_raised.checked_add(amount).ok_or_else(|| {
        LedgerError::InvalidAmount(format!(
            "donation of {} overflows the campaign total",
            amount
        ))
    })?;
    if is_new_donor {
        campaign.donor_count += 1;
    }

    ops.storage()
        .commit_campaign_with_donations(&campaign, std::slice::from_ref(&donation))
        .await?;

    info!(
        campaign_id = %campaign.id,
        donor = %donor.id,
        amount = %amount,
        raised = %campaign.amount_raised,
        "donation recorded"
    );

    Ok(campaign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ops::{create, moderate};
    use crate::storage::MemoryStorage;
    use crate::types::{CampaignDraft, PayoutAddress};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const NOW: Timestamp = Timestamp(1_000);

    async fn approved_campaign(
        config: EngineConfig,
        target: Decimal,
    ) -> (CampaignOps<MemoryStorage>, CampaignId) {
        let ops = CampaignOps::new(Arc::new(MemoryStorage::new()), config);
        let campaign = create::execute(
            &ops,
            &Actor::user("owner"),
            CampaignDraft {
                title: "Scholarships".to_string(),
                description: "School supplies and tuition".to_string(),
                target,
                deadline: NOW.plus_days(30),
                receiver: PayoutAddress::new("0x3456"),
            },
            NOW,
        )
        .await
        .unwrap();
        let id = campaign.id.clone();
        moderate::approve(&ops, &id, &Actor::admin("root"))
            .await
            .unwrap();
        (ops, id)
    }

    #[tokio::test]
    async fn test_donation_updates_aggregates() {
        let (ops, id) = approved_campaign(EngineConfig::test(), dec!(1000)).await;

        let campaign = execute(&ops, &id, &Actor::user("alice"), dec!(400), NOW.plus_millis(1))
            .await
            .unwrap();
        assert_eq!(campaign.amount_raised, dec!(400));
        assert_eq!(campaign.donor_count, 1);

        // Repeat donor does not bump the distinct donor count
        let campaign = execute(&ops, &id, &Actor::user("alice"), dec!(100), NOW.plus_millis(2))
            .await
            .unwrap();
        assert_eq!(campaign.amount_raised, dec!(500));
        assert_eq!(campaign.donor_count, 1);

        let campaign = execute(&ops, &id, &Actor::user("bob"), dec!(50), NOW.plus_millis(3))
            .await
            .unwrap();
        assert_eq!(campaign.donor_count, 2);

        let entries = ops.storage().list_donations(&id).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(crate::types::live_total(&entries), dec!(550));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amounts() {
        let (ops, id) = approved_campaign(EngineConfig::test(), dec!(1000)).await;

        for amount in [Decimal::ZERO, dec!(-10)] {
            let err = execute(&ops, &id, &Actor::user("alice"), amount, NOW.plus_millis(1))
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount(_)));
        }

        let campaign = ops.load_campaign(&id).await.unwrap();
        assert_eq!(campaign.amount_raised, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_rejects_pending_campaign() {
        let ops = CampaignOps::new(Arc::new(MemoryStorage::new()), EngineConfig::test());
        let campaign = create::execute(
            &ops,
            &Actor::user("owner"),
            CampaignDraft {
                title: "Pending".to_string(),
                description: String::new(),
                target: dec!(100),
                deadline: NOW.plus_days(10),
                receiver: PayoutAddress::new("0x1"),
            },
            NOW,
        )
        .await
        .unwrap();

        let err = execute(
            &ops,
            &campaign.id,
            &Actor::user("alice"),
            dec!(10),
            NOW.plus_millis(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotActive(_)));

        let unchanged = ops.load_campaign(&campaign.id).await.unwrap();
        assert_eq!(unchanged.amount_raised, Decimal::ZERO);
        assert_eq!(unchanged.donor_count, 0);
    }

    #[tokio::test]
    async fn test_rejects_blocked_campaign() {
        let (ops, id) = approved_campaign(EngineConfig::test(), dec!(1000)).await;
        execute(&ops, &id, &Actor::user("alice"), dec!(100), NOW.plus_millis(1))
            .await
            .unwrap();

        moderate::block(&ops, &id, &Actor::admin("root"), "frozen".to_string())
            .await
            .unwrap();

        let err = execute(&ops, &id, &Actor::user("bob"), dec!(50), NOW.plus_millis(2))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignBlocked(_)));

        // Totals untouched by the rejected donation
        let campaign = ops.load_campaign(&id).await.unwrap();
        assert_eq!(campaign.amount_raised, dec!(100));
    }

    #[tokio::test]
    async fn test_close_at_target_rejects_once_completed() {
        let (ops, id) = approved_campaign(EngineConfig::test(), dec!(1000)).await;

        execute(&ops, &id, &Actor::user("alice"), dec!(1000), NOW.plus_millis(1))
            .await
            .unwrap();

        let err = execute(&ops, &id, &Actor::user("bob"), dec!(1), NOW.plus_millis(2))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotActive(_)));
    }

    #[tokio::test]
    async fn test_accept_until_deadline_allows_overfunding() {
        let config = EngineConfig {
            overfunding: OverfundingPolicy::AcceptUntilDeadline,
            ..EngineConfig::test()
        };
        let (ops, id) = approved_campaign(config, dec!(1000)).await;

        execute(&ops, &id, &Actor::user("alice"), dec!(1000), NOW.plus_millis(1))
            .await
            .unwrap();

        // Target reached, but the deadline has not passed
        let campaign = execute(&ops, &id, &Actor::user("bob"), dec!(200), NOW.plus_millis(2))
            .await
            .unwrap();
        assert_eq!(campaign.amount_raised, dec!(1200));
    }

    #[tokio::test]
    async fn test_rejects_donations_after_withdrawal() {
        let configs = [
            EngineConfig::test(),
            EngineConfig {
                overfunding: OverfundingPolicy::AcceptUntilDeadline,
                ..EngineConfig::test()
            },
        ];
        for config in configs {
            let (ops, id) = approved_campaign(config, dec!(1000)).await;
            execute(&ops, &id, &Actor::user("alice"), dec!(1000), NOW.plus_millis(1))
                .await
                .unwrap();
            crate::ops::settle::withdraw(&ops, &id, &Actor::user("owner"), NOW.plus_millis(2))
                .await
                .unwrap();

            let err = execute(&ops, &id, &Actor::user("bob"), dec!(500), NOW.plus_millis(3))
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidState(_)));

            // The settled total is untouched
            let campaign = ops.load_campaign(&id).await.unwrap();
            assert_eq!(campaign.amount_raised, dec!(1000));
        }
    }

    #[tokio::test]
    async fn test_overflowing_total_is_rejected() {
        let config = EngineConfig {
            overfunding: OverfundingPolicy::AcceptUntilDeadline,
            ..EngineConfig::test()
        };
        let (ops, id) = approved_campaign(config, dec!(1000)).await;

        let mut campaign = ops.load_campaign(&id).await.unwrap();
        campaign.amount_raised = Decimal::MAX;
        ops.storage().save_campaign(&campaign).await.unwrap();

        let err = execute(&ops, &id, &Actor::user("alice"), dec!(1), NOW.plus_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn test_rejects_after_deadline() {
        let (ops, id) = approved_campaign(EngineConfig::test(), dec!(1000)).await;
        let after_deadline = NOW.plus_days(31);

        let err = execute(&ops, &id, &Actor::user("alice"), dec!(10), after_deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotActive(_)));
    }

    #[tokio::test]
    async fn test_unknown_campaign() {
        let (ops, _) = approved_campaign(EngineConfig::test(), dec!(1000)).await;
        let err = execute(
            &ops,
            &CampaignId("missing".to_string()),
            &Actor::user("alice"),
            dec!(10),
            NOW.plus_millis(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotFound(_)));
    }
}
