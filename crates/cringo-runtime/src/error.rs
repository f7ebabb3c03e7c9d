//! Runtime error types.

use cringo_core::{ChannelId, GameError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The channel already hosts a game.
    #[error("A game is already running in channel {channel}")]
    ChannelBusy { channel: ChannelId },

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// The global subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A malformed game command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown card size `{0}`, use 2, 4, 6, small, standard or large")]
    UnknownCardSize(String),

    #[error("invalid minimum balance `{0}`, use a non-negative number, `any` or `none`")]
    InvalidMinBalance(String),

    #[error("too many arguments")]
    TooManyArguments,
}

impl CommandError {
    /// The reply posted in the channel, with a usage line for the command.
    pub fn usage_hint(&self, prefix: &str, name: &str) -> String {
        format!("⚠️ {self}.\nUsage: `{prefix}{name} [size] [min_balance]`")
    }
}
