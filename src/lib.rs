//! Campaign Funding Lifecycle & Ledger Engine
//!
//! This crate is the behavioral core of a donation-campaign platform: it
//! decides which lifecycle transitions are legal, who may trigger them, and
//! keeps the campaign aggregates consistent with the donation ledger so that
//! no double-spend, illegal withdrawal, or inconsistent total can occur.
//! Transport, rendering, and authentication live elsewhere; the engine
//! consumes already-verified caller identities and emits payout signals to
//! an external rail.
//!
//! # Architecture
//!
//! - **Ledger Store** ([`storage`]): durable record of campaigns and
//!   donations; in-memory and sled backends behind one trait.
//! - **Donation Engine** ([`ops::donate`]): validates and applies donations,
//!   updating aggregates atomically with the appended ledger entry.
//! - **Moderation Engine** ([`ops::moderate`]): admin-only Pending ->
//!   Approved | Blocked transitions gating visibility and activity.
//! - **Outcome Resolver** ([`outcome`]): pure classification of an approved
//!   campaign as Active, Completed, or Failed, recomputed on every read.
//! - **Settlement Engine** ([`ops::settle`]): withdraw (owner, Completed)
//!   and refund (donor, Failed), each payable at most once per party.
//!
//! # Core invariants
//!
//! | Invariant | Requirement |
//! |-----------|-------------|
//! | **Ledger consistency** | `amount_raised` equals the sum of non-voided donations at every commit point |
//! | **Resolver totality** | Exactly one of Active/Completed/Failed holds for any input tuple |
//! | **Per-campaign serialization** | At most one in-flight mutation per campaign; cross-campaign ops are independent |
//! | **Single settlement** | `withdrawn` flips once; refunds are exactly-once per donor |
//! | **Frozen means frozen** | A Blocked campaign accepts no mutation of any kind |
//! | **Append-only audit** | Campaigns and donations persist indefinitely; refunds void, never delete |
//!
//! # Usage
//!
//! ```rust,no_run
//! use campaign_ledger::{
//!     memory_engine, Actor, CampaignDraft, EngineConfig, PayoutAddress, Timestamp,
//! };
//! use rust_decimal::Decimal;
//!
//! async fn example() {
//!     let engine = memory_engine(EngineConfig::default());
//!
//!     let owner = Actor::user("user:alice");
//!     let campaign = engine
//!         .create_campaign(
//!             &owner,
//!             CampaignDraft {
//!                 title: "Clean water wells".to_string(),
//!                 description: "Sustainable water infrastructure".to_string(),
//!                 target: Decimal::from(50_000),
//!                 deadline: Timestamp::now().plus_days(90),
//!                 receiver: PayoutAddress::new("0x1234"),
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     let admin = Actor::admin("admin:root");
//!     engine.approve_campaign(&campaign.id, &admin).await.unwrap();
//!
//!     let donor = Actor::user("user:bob");
//!     engine
//!         .donate(&campaign.id, &donor, Decimal::from(500))
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod ops;
pub mod outcome;
pub mod payout;
pub mod storage;
pub mod types;

pub use config::{EngineConfig, OverfundingPolicy};
pub use error::{LedgerError, LedgerResult};
pub use ops::{CampaignFilter, CampaignOps, CampaignView, PlatformStats};
pub use outcome::LifecycleStatus;
pub use payout::{
    LogPayout, PayoutDestination, PayoutKind, PayoutSignal, PayoutSink, RecordingPayout,
};
pub use storage::{LedgerStorage, MemoryStorage, SledStorage, StorageConfig};
pub use types::{
    Actor, ActorId, Campaign, CampaignDraft, CampaignId, Donation, DonationId, ModerationStatus,
    PayoutAddress, Role, Timestamp,
};

use std::sync::Arc;

/// Create an engine over in-memory storage (tests, development)
pub fn memory_engine(config: EngineConfig) -> CampaignOps<MemoryStorage> {
    CampaignOps::new(Arc::new(MemoryStorage::new()), config)
}

/// Create an engine over persistent sled storage
pub fn sled_engine(
    config: EngineConfig,
    storage_config: &StorageConfig,
) -> LedgerResult<CampaignOps<SledStorage>> {
    let storage = SledStorage::new(storage_config)?;
    Ok(CampaignOps::new(Arc::new(storage), config))
}
