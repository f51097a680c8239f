//! Core type definitions

pub mod campaign;
pub mod common;
pub mod donation;

pub use campaign::{Campaign, CampaignDraft, ModerationStatus};
pub use common::{Actor, ActorId, CampaignId, DonationId, PayoutAddress, Role, Timestamp};
pub use donation::{distinct_live_donors, live_total, Donation};
