//! Campaign record and moderation state machine
//!
//! A campaign moves through two orthogonal dimensions:
//! - moderation status (Pending -> Approved | Blocked), admin-driven
//! - lifecycle status (Active/Completed/Failed), derived on read from the
//!   funding outcome and never stored (see [`crate::outcome`])

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};
use crate::types::common::{ActorId, CampaignId, PayoutAddress, Timestamp};

/// Administrative moderation gate, independent of funding outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Awaiting admin review; not visible to donors
    Pending,
    /// Cleared by an admin; accepts donations while the lifecycle is Active
    Approved,
    /// Frozen by an admin; terminal, no further mutation of any kind
    Blocked,
}

impl ModerationStatus {
    /// Blocked is the only terminal moderation state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Whether a moderation transition to `target` is legal
    pub fn can_transition_to(&self, target: ModerationStatus) -> bool {
        match (self, target) {
            (Self::Pending, Self::Approved) => true,
            (Self::Pending, Self::Blocked) => true,
            // Blocking an already-approved (possibly funded) campaign is allowed
            (Self::Approved, Self::Blocked) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Validated input for campaign creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub title: String,
    pub description: String,
    pub target: Decimal,
    pub deadline: Timestamp,
    pub receiver: PayoutAddress,
}

/// Durable campaign record
///
/// `amount_raised` and `donor_count` are derived aggregates: at every commit
/// point they equal, respectively, the sum of non-voided donation amounts and
/// the count of distinct donors holding at least one non-voided donation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier, immutable
    pub id: CampaignId,
    /// Identity of the creator; authorizes withdrawal
    pub owner: ActorId,
    /// Payout destination; immutable after creation
    pub receiver: PayoutAddress,
    pub title: String,
    pub description: String,
    /// Funding goal, positive and immutable
    pub target: Decimal,
    /// Funding cutoff, immutable
    pub deadline: Timestamp,
    pub created_at: Timestamp,
    /// Sum of non-voided donation amounts (derived)
    pub amount_raised: Decimal,
    /// Distinct donors with at least one non-voided donation (derived)
    pub donor_count: u64,
    pub moderation_status: ModerationStatus,
    /// Reason recorded when an admin blocks the campaign
    pub block_reason: Option<String>,
    /// Set at most once, by a successful withdrawal
    pub withdrawn: bool,
    pub withdrawn_at: Option<Timestamp>,
    /// Per-campaign monotonic donation sequence counter
    pub donation_seq: u64,
}

impl Campaign {
    /// Create a new campaign in the Pending moderation state
    pub fn new(owner: ActorId, draft: CampaignDraft, now: Timestamp) -> Self {
        Self {
            id: CampaignId::generate(),
            owner,
            receiver: draft.receiver,
            title: draft.title,
            description: draft.description,
            target: draft.target,
            deadline: draft.deadline,
            created_at: now,
            amount_raised: Decimal::ZERO,
            donor_count: 0,
            moderation_status: ModerationStatus::Pending,
            block_reason: None,
            withdrawn: false,
            withdrawn_at: None,
            donation_seq: 0,
        }
    }

    /// Whether the campaign is frozen by moderation
    pub fn is_blocked(&self) -> bool {
        self.moderation_status == ModerationStatus::Blocked
    }

    /// Transition Pending -> Approved
    ///
    /// Retrying after success fails with `InvalidState` rather than silently
    /// succeeding twice.
    pub fn approve(&mut self) -> LedgerResult<()> {
        if !self
            .moderation_status
            .can_transition_to(ModerationStatus::Approved)
        {
            return Err(LedgerError::InvalidState(format!(
                "cannot approve campaign {} in moderation state {}",
                self.id, self.moderation_status
            )));
        }
        self.moderation_status = ModerationStatus::Approved;
        Ok(())
    }

    /// Transition Pending|Approved -> Blocked
    pub fn block(&mut self, reason: impl Into<String>) -> LedgerResult<()> {
        if !self
            .moderation_status
            .can_transition_to(ModerationStatus::Blocked)
        {
            return Err(LedgerError::InvalidState(format!(
                "cannot block campaign {} in moderation state {}",
                self.id, self.moderation_status
            )));
        }
        self.moderation_status = ModerationStatus::Blocked;
        self.block_reason = Some(reason.into());
        Ok(())
    }

    /// Mark the withdrawal as settled. The flag transition is the sole gate
    /// against double payout, so it must only flip false -> true.
    pub fn mark_withdrawn(&mut self, now: Timestamp) -> LedgerResult<()> {
        if self.withdrawn {
            return Err(LedgerError::AlreadyWithdrawn(self.id.to_string()));
        }
        self.withdrawn = true;
        self.withdrawn_at = Some(now);
        Ok(())
    }

    /// Allocate the next per-campaign donation sequence number
    pub fn next_donation_seq(&mut self) -> u64 {
        self.donation_seq += 1;
        self.donation_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> CampaignDraft {
        CampaignDraft {
            title: "Clean water wells".to_string(),
            description: "Water infrastructure for rural communities".to_string(),
            target: dec!(50000),
            deadline: Timestamp::from_millis(2_000_000),
            receiver: PayoutAddress::new("0x1234"),
        }
    }

    #[test]
    fn test_new_campaign_is_pending_and_empty() {
        let c = Campaign::new(ActorId::new("owner"), draft(), Timestamp::from_millis(1));
        assert_eq!(c.moderation_status, ModerationStatus::Pending);
        assert_eq!(c.amount_raised, Decimal::ZERO);
        assert_eq!(c.donor_count, 0);
        assert!(!c.withdrawn);
    }

    #[test]
    fn test_moderation_transitions() {
        let mut c = Campaign::new(ActorId::new("owner"), draft(), Timestamp::from_millis(1));

        c.approve().unwrap();
        assert_eq!(c.moderation_status, ModerationStatus::Approved);

        // No duplicate approvals
        assert!(matches!(c.approve(), Err(LedgerError::InvalidState(_))));

        // Blocking a funded campaign is allowed
        c.block("fraud report").unwrap();
        assert_eq!(c.moderation_status, ModerationStatus::Blocked);
        assert_eq!(c.block_reason.as_deref(), Some("fraud report"));

        // Blocked is terminal
        assert!(matches!(c.approve(), Err(LedgerError::InvalidState(_))));
        assert!(matches!(c.block("again"), Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_withdrawn_flag_flips_once() {
        let mut c = Campaign::new(ActorId::new("owner"), draft(), Timestamp::from_millis(1));
        c.mark_withdrawn(Timestamp::from_millis(10)).unwrap();
        assert!(c.withdrawn);
        assert!(matches!(
            c.mark_withdrawn(Timestamp::from_millis(11)),
            Err(LedgerError::AlreadyWithdrawn(_))
        ));
    }

    #[test]
    fn test_donation_seq_is_monotonic() {
        let mut c = Campaign::new(ActorId::new("owner"), draft(), Timestamp::from_millis(1));
        let a = c.next_donation_seq();
        let b = c.next_donation_seq();
        assert!(b > a);
    }
}
