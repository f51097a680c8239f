//! Payout signaling
//!
//! The settlement engine does not move money itself; it emits a payout
//! signal to an external rail (bank transfer, on-chain payment) once the
//! ledger-side state transition has committed. [`PayoutSink`] is that seam.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::LedgerResult;
use crate::types::{ActorId, CampaignId, PayoutAddress, Timestamp};

/// Why a payout was signaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    /// Owner withdrawal of a completed campaign's raised amount
    Withdrawal,
    /// Refund of a donor's voided donations on a failed campaign
    Refund,
}

/// A single emitted payout signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutSignal {
    pub campaign_id: CampaignId,
    pub kind: PayoutKind,
    /// Destination: campaign receiver for withdrawals, donor identity for refunds
    pub destination: PayoutDestination,
    pub amount: Decimal,
    pub signaled_at: Timestamp,
}

/// Payout destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutDestination {
    /// The campaign's receiver address
    Address(PayoutAddress),
    /// A donor identity, resolved to a rail account by the payout provider
    Donor(ActorId),
}

/// Payout signal consumer
///
/// The ledger-side state transition commits before the signal is emitted, so
/// a sink error cannot undo it: the caller sees `Err` but the withdrawn flag
/// or voided entries are already durable. Sinks must be reconcilable from
/// the ledger, not from the returned error.
#[async_trait]
pub trait PayoutSink: Send + Sync {
    /// Deliver a payout signal to the external rail
    async fn signal(&self, payout: PayoutSignal) -> LedgerResult<()>;
}

/// Sink that only logs payout signals
///
/// Default sink for deployments where the rail is driven by a downstream
/// consumer of the log stream.
#[derive(Debug, Default)]
pub struct LogPayout;

#[async_trait]
impl PayoutSink for LogPayout {
    async fn signal(&self, payout: PayoutSignal) -> LedgerResult<()> {
        info!(
            campaign_id = %payout.campaign_id,
            kind = ?payout.kind,
            amount = %payout.amount,
            "payout signaled"
        );
        Ok(())
    }
}

/// Sink that records every signal in memory, for tests and audits
#[derive(Debug, Default)]
pub struct RecordingPayout {
    signals: Arc<RwLock<Vec<PayoutSignal>>>,
}

impl RecordingPayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// All signals emitted so far, in order
    pub async fn signals(&self) -> Vec<PayoutSignal> {
        self.signals.read().await.clone()
    }
}

#[async_trait]
impl PayoutSink for RecordingPayout {
    async fn signal(&self, payout: PayoutSignal) -> LedgerResult<()> {
        self.signals.write().await.push(payout);
        Ok(())
    }
}
