//! Collaborator traits a game talks to.
//!
//! The game never reaches a chat platform, an account store or a moderation
//! list directly. It only calls the traits in this module, so a host can plug
//! in a real adapter while tests use the in-memory versions from
//! [`crate::memory`].

use std::sync::Arc;

use async_trait::async_trait;
use cringo_core::{ChannelId, DeliveryResult, LedgerResult, MessageId, Participant, UserId};

use crate::roster::PlayingRoster;

/// Sends messages and reads reactions on the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a private message to a user.
    ///
    /// Fails with [`DeliveryError::Unreachable`](cringo_core::DeliveryError::Unreachable)
    /// when the user does not accept private messages.
    async fn send_private(&self, user: &UserId, content: &str) -> DeliveryResult<MessageId>;

    /// Posts a message in a channel.
    async fn send_channel(&self, channel: &ChannelId, content: &str) -> DeliveryResult<MessageId>;

    /// Adds a reaction from the bot to a message.
    async fn add_reaction(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> DeliveryResult<()>;

    /// Lists everyone who reacted to a message with `emoji`, bots included.
    async fn reactions(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> DeliveryResult<Vec<Participant>>;
}

/// Per-user currency balances and game statistics.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance of a user.
    async fn balance(&self, user: &UserId) -> LedgerResult<f64>;

    /// Adds `amount` (possibly negative) and returns the new balance.
    async fn credit(&self, user: &UserId, amount: f64) -> LedgerResult<f64>;

    /// Records one finished game for a user.
    async fn record_game_stats(&self, user: &UserId, awarded: f64, won: bool) -> LedgerResult<()>;
}

/// Answers whether a user is banned from playing.
#[async_trait]
pub trait Moderation: Send + Sync {
    async fn is_banned(&self, user: &UserId) -> bool;
}

/// A boxed [`Messenger`].
pub type BoxedMessenger = Arc<dyn Messenger>;
/// A boxed [`Ledger`].
pub type BoxedLedger = Arc<dyn Ledger>;
/// A boxed [`Moderation`].
pub type BoxedModeration = Arc<dyn Moderation>;

/// Everything a running game needs from its host.
///
/// Cloning is cheap; all collaborators are shared. The [`PlayingRoster`] must
/// be the same instance for every game the host runs so that a user cannot
/// sit at two tables at once.
#[derive(Clone)]
pub struct GameServices {
    pub messenger: BoxedMessenger,
    pub ledger: BoxedLedger,
    pub moderation: BoxedModeration,
    pub roster: PlayingRoster,
}

impl GameServices {
    pub fn new(
        messenger: BoxedMessenger,
        ledger: BoxedLedger,
        moderation: BoxedModeration,
        roster: PlayingRoster,
    ) -> Self {
        Self {
            messenger,
            ledger,
            moderation,
            roster,
        }
    }
}

impl std::fmt::Debug for GameServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameServices")
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}
