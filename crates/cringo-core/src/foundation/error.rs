//! Error types shared across the CRINGO! crates.
//!
//! Runtime-level errors (configuration, command parsing) are defined in
//! `cringo-runtime`.

use thiserror::Error;

use super::ids::{ChannelId, UserId};
use crate::game::GamePhase;

// =============================================================================
// Delivery Errors
// =============================================================================

/// Errors reported by the messaging platform when sending.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The user cannot receive private messages (DMs closed, blocked, left).
    #[error("user '{user}' cannot receive private messages")]
    Unreachable {
        /// The user that could not be reached.
        user: UserId,
    },

    /// The channel is gone or the bot may not post there.
    #[error("channel '{channel}' is unavailable")]
    ChannelUnavailable {
        /// The channel that rejected the message.
        channel: ChannelId,
    },

    /// Any other platform failure.
    #[error("delivery failed: {0}")]
    Failed(String),
}

impl DeliveryError {
    /// Creates a generic delivery failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

// =============================================================================
// Ledger Errors
// =============================================================================

/// Errors reported by the account store.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// No account exists for the user.
    #[error("no account for user '{user}'")]
    AccountNotFound {
        /// The unknown user.
        user: UserId,
    },

    /// The backing store failed.
    #[error("ledger storage error: {0}")]
    Storage(String),
}

// =============================================================================
// Game Errors
// =============================================================================

/// Errors raised by the game rules and the game flow.
#[derive(Debug, Clone, Error)]
pub enum GameError {
    /// A column pool has fewer unused symbols than requested.
    #[error("column {column} has {available} unused symbols, {requested} requested")]
    PoolExhausted {
        /// Zero-based column index.
        column: usize,
        /// Symbols requested from the column.
        requested: usize,
        /// Symbols still available in the column.
        available: usize,
    },

    /// Card sizes other than 2, 4 and 6 are not playable.
    #[error("unsupported card size: {0}")]
    UnsupportedCardSize(u8),

    /// The game tried to move backwards or skip a phase.
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition {
        /// Phase the game was in.
        from: GamePhase,
        /// Phase that was requested.
        to: GamePhase,
    },

    /// The game channel rejected a broadcast.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
