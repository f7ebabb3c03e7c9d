//! # CRINGO! Framework
//!
//! The async side of a CRINGO! game.
//!
//! This layer provides:
//! - Collaborator traits a host implements: [`Messenger`], [`Ledger`], [`Moderation`]
//! - The [`EventBus`] that fans inbound events out to running games
//! - The process-wide [`PlayingRoster`] that keeps a user at one table
//! - The join window ([`JoinCoordinator`]) and timed rounds ([`RoundEngine`])
//! - The [`CringoGame`] orchestrator tying them together
//! - In-memory collaborators for tests and demos ([`memory`])
//!
//! The rules themselves live in `cringo-core`; nothing here decides what a
//! match is worth.

pub mod bus;
pub mod display;
pub mod game;
pub mod join;
pub mod memory;
pub mod platform;
pub mod roster;
pub mod round;
pub mod settings;
pub mod table;

// Implementors of the collaborator traits need the same macro.
pub use async_trait::async_trait;
pub use bus::{DEFAULT_EVENT_BUFFER, EventBus, Subscription};
pub use game::{CringoGame, GameContext, GameReport};
pub use join::{BounceReason, JoinCoordinator, JoinOutcome};
pub use platform::{
    BoxedLedger, BoxedMessenger, BoxedModeration, GameServices, Ledger, Messenger, Moderation,
};
pub use roster::{PlayingRoster, RosterClaim};
pub use round::{Removal, RemovalReason, RoundEngine, RoundSummary};
pub use settings::{GameRequest, GameSettings};
pub use table::{Seat, Table};
