//! Donation ledger entries
//!
//! A donation is immutable once recorded, except for the `voided` flag which
//! a refund flips exactly once. Entries are never deleted; the full ledger
//! persists for audit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::types::common::{ActorId, CampaignId, DonationId, Timestamp};

/// A recorded pledge of funds against a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub donor: ActorId,
    /// Positive amount pledged
    pub amount: Decimal,
    /// Monotonic per-campaign sequence number
    pub seq: u64,
    pub timestamp: Timestamp,
    /// True once a refund has claimed this entry
    pub voided: bool,
    pub voided_at: Option<Timestamp>,
}

impl Donation {
    pub fn new(
        campaign_id: CampaignId,
        donor: ActorId,
        amount: Decimal,
        seq: u64,
        now: Timestamp,
    ) -> Self {
        Self {
            id: DonationId::generate(),
            campaign_id,
            donor,
            amount,
            seq,
            timestamp: now,
            voided: false,
            voided_at: None,
        }
    }

    /// Mark this entry as claimed by a refund. Voiding is one-way.
    pub fn void(&mut self, now: Timestamp) -> LedgerResult<()> {
        if self.voided {
            return Err(LedgerError::AlreadyRefunded {
                campaign_id: self.campaign_id.to_string(),
                donor: self.donor.to_string(),
            });
        }
        self.voided = true;
        self.voided_at = Some(now);
        Ok(())
    }
}

/// Sum of non-voided amounts in a donation set
pub fn live_total(donations: &[Donation]) -> Decimal {
    donations
        .iter()
        .filter(|d| !d.voided)
        .map(|d| d.amount)
        .sum()
}

/// Count of distinct donors holding at least one non-voided donation
pub fn distinct_live_donors(donations: &[Donation]) -> u64 {
    let mut donors: Vec<&ActorId> = donations
        .iter()
        .filter(|d| !d.voided)
        .map(|d| &d.donor)
        .collect();
    donors.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    donors.dedup();
    donors.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn donation(donor: &str, amount: Decimal, seq: u64) -> Donation {
        Donation::new(
            CampaignId("c1".to_string()),
            ActorId::new(donor),
            amount,
            seq,
            Timestamp::from_millis(seq),
        )
    }

    #[test]
    fn test_void_is_one_way() {
        let mut d = donation("alice", dec!(100), 1);
        d.void(Timestamp::from_millis(5)).unwrap();
        assert!(d.voided);
        assert!(matches!(
            d.void(Timestamp::from_millis(6)),
            Err(LedgerError::AlreadyRefunded { .. })
        ));
    }

    #[test]
    fn test_live_total_excludes_voided() {
        let mut entries = vec![
            donation("alice", dec!(400), 1),
            donation("bob", dec!(700), 2),
        ];
        assert_eq!(live_total(&entries), dec!(1100));

        entries[0].void(Timestamp::from_millis(9)).unwrap();
        assert_eq!(live_total(&entries), dec!(700));
    }

    #[test]
    fn test_distinct_live_donors() {
        let mut entries = vec![
            donation("alice", dec!(10), 1),
            donation("alice", dec!(20), 2),
            donation("bob", dec!(30), 3),
        ];
        assert_eq!(distinct_live_donors(&entries), 2);

        entries[0].void(Timestamp::from_millis(9)).unwrap();
        // Alice still holds one live donation
        assert_eq!(distinct_live_donors(&entries), 2);

        entries[1].void(Timestamp::from_millis(10)).unwrap();
        assert_eq!(distinct_live_donors(&entries), 1);
    }
}
