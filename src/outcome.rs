//! Outcome resolution
//!
//! Classifies an approved campaign's funding outcome as a pure function of
//! (target, amount raised, deadline, now). The classification is evaluated
//! lazily on read: no scheduler materializes it, and every caller recomputes
//! it identically from the same inputs. Once the deadline has passed the
//! result is stable because none of its inputs can move it back to Active.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Campaign, Timestamp};

/// Funding outcome of an approved campaign
///
/// Exactly one variant holds for any (target, amount_raised, deadline, now)
/// tuple. Not defined for Pending or Blocked campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Target not reached and deadline not passed; accepting donations
    Active,
    /// Target reached; owner may withdraw
    Completed,
    /// Deadline passed with target unmet; donors may claim refunds
    Failed,
}

impl LifecycleStatus {
    /// Completed and Failed are terminal: the settlement engine consumes them
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Classify a funding outcome
///
/// - Active iff `amount_raised < target` and `now < deadline`
/// - Completed iff `amount_raised >= target`, regardless of remaining time
/// - Failed iff `amount_raised < target` and `now >= deadline`
pub fn resolve(
    target: Decimal,
    amount_raised: Decimal,
    deadline: Timestamp,
    now: Timestamp,
) -> LifecycleStatus {
    if amount_raised >= target {
        LifecycleStatus::Completed
    } else if now < deadline {
        LifecycleStatus::Active
    } else {
        LifecycleStatus::Failed
    }
}

/// Resolve a campaign's lifecycle status at `now`
pub fn resolve_campaign(campaign: &Campaign, now: Timestamp) -> LifecycleStatus {
    resolve(campaign.target, campaign.amount_raised, campaign.deadline, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const DEADLINE: Timestamp = Timestamp(1_000);

    #[test]
    fn test_active_before_deadline_under_target() {
        let status = resolve(dec!(1000), dec!(300), DEADLINE, Timestamp(500));
        assert_eq!(status, LifecycleStatus::Active);
    }

    #[test]
    fn test_completed_when_target_reached_before_deadline() {
        let status = resolve(dec!(1000), dec!(1100), DEADLINE, Timestamp(500));
        assert_eq!(status, LifecycleStatus::Completed);
    }

    #[test]
    fn test_completed_when_target_met_exactly() {
        let status = resolve(dec!(1000), dec!(1000), DEADLINE, Timestamp(500));
        assert_eq!(status, LifecycleStatus::Completed);
    }

    #[test]
    fn test_completed_survives_deadline() {
        let status = resolve(dec!(1000), dec!(1000), DEADLINE, Timestamp(5_000));
        assert_eq!(status, LifecycleStatus::Completed);
    }

    #[test]
    fn test_failed_at_deadline_under_target() {
        // The deadline instant itself already counts as passed
        let status = resolve(dec!(1000), dec!(999), DEADLINE, DEADLINE);
        assert_eq!(status, LifecycleStatus::Failed);
    }

    #[test]
    fn test_totality_over_boundary_grid() {
        // Every combination around the two boundaries resolves to exactly
        // one status.
        let amounts = [dec!(0), dec!(999), dec!(1000), dec!(1001)];
        let clocks = [Timestamp(0), Timestamp(999), Timestamp(1_000), Timestamp(1_001)];
        for amount in amounts {
            for now in clocks {
                let status = resolve(dec!(1000), amount, DEADLINE, now);
                let expected = if amount >= dec!(1000) {
                    LifecycleStatus::Completed
                } else if now < DEADLINE {
                    LifecycleStatus::Active
                } else {
                    LifecycleStatus::Failed
                };
                assert_eq!(status, expected, "amount={amount} now={now}");
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LifecycleStatus::Active.is_terminal());
        assert!(LifecycleStatus::Completed.is_terminal());
        assert!(LifecycleStatus::Failed.is_terminal());
    }
}
