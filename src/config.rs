//! Engine Configuration
//!
//! Policy knobs for the lifecycle engine. Supports loading from environment
//! variables with the CAMPAIGN_ prefix.

use serde::{Deserialize, Serialize};
use std::env;

/// What happens to donations once the target has been reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverfundingPolicy {
    /// Reaching the target closes the campaign to further donations:
    /// a Completed campaign is no longer Active, so `donate` rejects.
    CloseAtTarget,
    /// Donations are accepted until the deadline regardless of amount
    /// raised; the lifecycle classification still flips to Completed the
    /// moment the target is reached.
    AcceptUntilDeadline,
}

impl Default for OverfundingPolicy {
    fn default() -> Self {
        Self::CloseAtTarget
    }
}

impl OverfundingPolicy {
    /// Parse from string (for environment variables)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "close_at_target" | "close" => Some(Self::CloseAtTarget),
            "accept_until_deadline" | "accept" => Some(Self::AcceptUntilDeadline),
            _ => None,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Overfunding policy (see [`OverfundingPolicy`])
    pub overfunding: OverfundingPolicy,
    /// Maximum distance between creation time and deadline, in whole days
    #[serde(default = "default_deadline_horizon")]
    pub max_deadline_horizon_days: u64,
    /// Maximum accepted title length
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,
    /// Maximum accepted description length
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,
}

fn default_deadline_horizon() -> u64 {
    365
}

fn default_max_title_len() -> usize {
    200
}

fn default_max_description_len() -> usize {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overfunding: OverfundingPolicy::default(),
            max_deadline_horizon_days: default_deadline_horizon(),
            max_title_len: default_max_title_len(),
            max_description_len: default_max_description_len(),
        }
    }
}

impl EngineConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self::default()
    }

    /// Test configuration
    pub fn test() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - CAMPAIGN_OVERFUNDING_POLICY: close_at_target | accept_until_deadline
    /// - CAMPAIGN_MAX_DEADLINE_HORIZON_DAYS: deadline horizon in days
    /// - CAMPAIGN_MAX_TITLE_LEN: maximum title length
    /// - CAMPAIGN_MAX_DESCRIPTION_LEN: maximum description length
    pub fn from_env() -> Self {
        let base = Self::default();

        let overfunding = env::var("CAMPAIGN_OVERFUNDING_POLICY")
            .ok()
            .and_then(|s| OverfundingPolicy::parse(&s))
            .unwrap_or(base.overfunding);

        let max_deadline_horizon_days = env::var("CAMPAIGN_MAX_DEADLINE_HORIZON_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(base.max_deadline_horizon_days);

        let max_title_len = env::var("CAMPAIGN_MAX_TITLE_LEN")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(base.max_title_len);

        let max_description_len = env::var("CAMPAIGN_MAX_DESCRIPTION_LEN")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(base.max_description_len);

        Self {
            overfunding,
            max_deadline_horizon_days,
            max_title_len,
            max_description_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.overfunding, OverfundingPolicy::CloseAtTarget);
        assert_eq!(config.max_deadline_horizon_days, 365);
    }

    #[test]
    fn test_overfunding_policy_parse() {
        assert_eq!(
            OverfundingPolicy::parse("close_at_target"),
            Some(OverfundingPolicy::CloseAtTarget)
        );
        assert_eq!(
            OverfundingPolicy::parse("ACCEPT"),
            Some(OverfundingPolicy::AcceptUntilDeadline)
        );
        assert_eq!(OverfundingPolicy::parse("bogus"), None);
    }
}
