//! # CRINGO!
//!
//! A multiplayer emoji-bingo game played through a chat bot.
//!
//! ## Overview
//!
//! A host types `!cringo` in a channel. Players join by reacting to the
//! announcement, receive a private card of emoji, and race through timed
//! rounds claiming called symbols by coordinate. Completed rows, columns and
//! diagonals score bonuses; final scores turn into currency on a ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────┐     ┌────────────────────────────────┐
//! │   Adapter   │────▶│  Runtime  │────▶│ Game #general (own task)       │──▶ Messenger / Ledger
//! │ (platform)  │     │ event bus │────▶│ Game #lobby   (own task)       │──▶ Messenger / Ledger
//! └─────────────┘     └───────────┘     └────────────────────────────────┘
//! ```
//!
//! - **core**: the rules, with no I/O (cards, scoring, payout)
//! - **framework**: the async game flow and the collaborator traits
//! - **runtime**: configuration, logging, commands, one game per channel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cringo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let services = GameServices::new(messenger, ledger, moderation, PlayingRoster::new());
//!     let runtime = CringoRuntime::builder().build(services)?;
//!     runtime.run(inbound_events).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use cringo_core as core;
pub use cringo_framework as framework;
pub use cringo_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use cringo::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use cringo_runtime::{CringoConfig, CringoRuntime, RuntimeError};

    // Collaborators a host implements
    pub use cringo_framework::{
        GameServices, Ledger, Messenger, Moderation, PlayingRoster, async_trait,
    };

    // Running a single game directly
    pub use cringo_framework::{
        CringoGame, EventBus, GameContext, GameReport, GameRequest, GameSettings,
    };

    // Identities and events
    pub use cringo_core::{
        CardSize, ChannelId, DeliveryError, DeliveryResult, InboundEvent, LedgerError,
        LedgerResult, MessageId, MinBalance, Participant, UserId, VenueId,
    };
}
