//! Campaign creation
//!
//! Validates a draft and records the campaign in the Pending moderation
//! state. Any authenticated caller may create a campaign.

use rust_decimal::Decimal;
use tracing::info;

use super::CampaignOps;
use crate::config::EngineConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::LedgerStorage;
use crate::types::{Actor, Campaign, CampaignDraft, Timestamp};

/// Validate a draft against engine policy
pub fn validate_draft(
    config: &EngineConfig,
    draft: &CampaignDraft,
    now: Timestamp,
) -> LedgerResult<()> {
    if draft.title.trim().is_empty() {
        return Err(LedgerError::InvalidInput("title must not be empty".into()));
    }
    if draft.title.len() > config.max_title_len {
        return Err(LedgerError::InvalidInput(format!(
            "title exceeds {} characters",
            config.max_title_len
        )));
    }
    if draft.description.len() > config.max_description_len {
        return Err(LedgerError::InvalidInput(format!(
            "description exceeds {} characters",
            config.max_description_len
        )));
    }
    if draft.receiver.is_empty() {
        return Err(LedgerError::InvalidInput(
            "receiver address must not be empty".into(),
        ));
    }
    if draft.target <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "target must be positive, got {}",
            draft.target
        )));
    }
    if draft.deadline <= now {
        return Err(LedgerError::InvalidDeadline(
            "deadline must be in the future".into(),
        ));
    }
    let horizon = now.plus_days(config.max_deadline_horizon_days);
    if draft.deadline > horizon {
        return Err(LedgerError::InvalidDeadline(format!(
            "deadline exceeds the {}-day horizon",
            config.max_deadline_horizon_days
        )));
    }
    Ok(())
}

/// Execute campaign creation
pub async fn execute<S: LedgerStorage + 'static>(
    ops: &CampaignOps<S>,
    actor: &Actor,
    draft: CampaignDraft,
    now: Timestamp,
) -> LedgerResult<Campaign> {
    validate_draft(ops.config(), &draft, now)?;

    let campaign = Campaign::new(actor.id.clone(), draft, now);
    ops.storage().save_campaign(&campaign).await?;

    info!(
        campaign_id = %campaign.id,
        owner = %campaign.owner,
        target = %campaign.target,
        "campaign created, awaiting moderation"
    );

    Ok(campaign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayoutAddress;
    use rust_decimal_macros::dec;

    const NOW: Timestamp = Timestamp(1_000);

    fn draft() -> CampaignDraft {
        CampaignDraft {
            title: "Emergency relief".to_string(),
            description: "Flood relief supplies".to_string(),
            target: dec!(25000),
            deadline: NOW.plus_days(30),
            receiver: PayoutAddress::new("0x2345"),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        validate_draft(&EngineConfig::test(), &draft(), NOW).unwrap();
    }

    #[test]
    fn test_rejects_non_positive_target() {
        let mut d = draft();
        d.target = Decimal::ZERO;
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidAmount(_))
        ));

        d.target = dec!(-5);
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_rejects_past_deadline() {
        let mut d = draft();
        d.deadline = Timestamp(500);
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn test_rejects_deadline_beyond_horizon() {
        let mut d = draft();
        d.deadline = NOW.plus_days(366);
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn test_rejects_blank_title_and_receiver() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidInput(_))
        ));

        let mut d = draft();
        d.receiver = PayoutAddress::new("");
        assert!(matches!(
            validate_draft(&EngineConfig::test(), &d, NOW),
            Err(LedgerError::InvalidInput(_))
        ));
    }
}
