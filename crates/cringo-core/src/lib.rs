//! # CRINGO! Core
//!
//! Rules and foundation types for the CRINGO! multiplayer matching game.
//!
//! Everything in this crate is synchronous and free of I/O. The async flow
//! (join window, timed rounds, private delivery) lives in `cringo-framework`
//! and drives the types defined here.
//!
//! ## Layers
//!
//! ### Foundation Layer
//!
//! Identifiers and the inbound event model shared by every crate:
//! - **Identities**: [`UserId`], [`ChannelId`], [`MessageId`], [`VenueId`], [`Participant`]
//! - **Events**: [`InboundEvent`] stamped with its arrival instant
//! - **Errors**: [`DeliveryError`], [`LedgerError`], [`GameError`]
//!
//! ### Game Layer
//!
//! The pure rules:
//! - **Cards**: [`CardSize`], [`Card`], [`CardGenerator`]
//! - **Players**: [`PlayerSession`]
//! - **Scoring**: [`mark_card`], [`mark_message`], [`cringo_score`]
//! - **Payout**: [`nerf`], [`compute_payouts`]
//! - **Flow**: [`GamePhase`], [`RoundState`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::collections::HashSet;
//!
//! use cringo_core::{CardGenerator, CardSize, PlayerSession, RoundState, UserId, mark_card};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let generator = CardGenerator::new(CardSize::Standard);
//! let mut player = PlayerSession::new(UserId::new("42"), generator.card(&mut rng)?);
//!
//! let mut called = HashSet::new();
//! called.extend(generator.call(&mut rng, &called)?);
//!
//! let round = RoundState::new(1, CardSize::Standard.total_rounds(), called.iter().copied().collect());
//! mark_card(&mut player, "b3", &called, round.multiplier);
//! ```

pub mod foundation;
pub mod game;

pub use foundation::{
    ChannelId, DeliveryError, DeliveryResult, EventKind, GameError, GameResult, InboundEvent,
    LedgerError, LedgerResult, MessageId, Participant, UserId, VenueId,
};

pub use game::{
    Award, Card, CardGenerator, CardSize, Cell, GamePhase, JOIN_EMOJI, Line, LineAward,
    MATCHED_MARKER, MarkOutcome, MinBalance, Payout, PlayerSession, Position, RoundState, Symbol,
    Token, compute_payouts, cringo_score, mark_card, mark_message, nerf, parse_token,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::game::*;
}
