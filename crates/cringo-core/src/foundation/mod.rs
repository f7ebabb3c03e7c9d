//! Foundation layer - identities, inbound events and error types.
//!
//! This module contains the building blocks shared by every CRINGO! crate:
//! - Opaque platform identifiers
//! - The inbound event model consumed by the join window and the rounds
//! - Per-concern error enums

pub mod error;
pub mod event;
pub mod ids;

pub use error::{
    DeliveryError, DeliveryResult, GameError, GameResult, LedgerError, LedgerResult,
};
pub use event::{EventKind, InboundEvent};
pub use ids::{ChannelId, MessageId, Participant, UserId, VenueId};
