//! Ledger Engine Error Types
//!
//! Error definitions for the campaign funding lifecycle domain.

use thiserror::Error;

/// Ledger engine errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller lacks the role or identity the operation requires
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unknown campaign id
    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    /// Operation not legal in the campaign's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Non-positive or malformed monetary amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Deadline is in the past or beyond the allowed horizon
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    /// Malformed or missing input field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Campaign is not accepting donations
    #[error("Campaign not active: {0}")]
    CampaignNotActive(String),

    /// Campaign is frozen by moderation; no mutation is legal
    #[error("Campaign blocked: {0}")]
    CampaignBlocked(String),

    /// Withdrawal was already settled for this campaign
    #[error("Already withdrawn: campaign {0}")]
    AlreadyWithdrawn(String),

    /// The donor's donations on this campaign are already voided
    #[error("Already refunded: donor {donor} on campaign {campaign_id}")]
    AlreadyRefunded { campaign_id: String, donor: String },

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Payout signal could not be delivered
    #[error("Payout error: {0}")]
    Payout(String),
}

/// Ledger result type
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(e: sled::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}
