//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use cringo_core::{CardSize, MinBalance, VenueId};
use cringo_framework::{DEFAULT_EVENT_BUFFER, GameSettings};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CringoConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub payout: PayoutConfig,
}

impl CringoConfig {
    /// Timing and limits handed to every game.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            join_window: Duration::from_secs(self.game.join_window_secs),
            join_capacity: self.game.join_capacity,
            scoreboard_pause: Duration::from_secs(self.game.scoreboard_pause_secs),
            round_time: Duration::from_secs(self.game.round_secs),
            mismatch_limit: self.game.mismatch_limit,
            home_venue: self.payout.home_venue.clone(),
            home_bonus: self.payout.home_bonus,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Appends to [`LoggingConfig::file_path`].
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line number.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-module levels, e.g. `cringo_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Game
// =============================================================================

/// `[game]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    #[serde(default = "default_command_name")]
    pub command_name: String,

    /// Card side used when the command names no size.
    #[serde(default = "default_card_size")]
    pub default_card_size: u8,

    /// Minimum balance used when the command names none. `None` admits anyone.
    #[serde(default = "default_min_balance")]
    pub default_min_balance: Option<f64>,

    #[serde(default = "default_join_window_secs")]
    pub join_window_secs: u64,

    #[serde(default = "default_join_capacity")]
    pub join_capacity: usize,

    #[serde(default = "default_scoreboard_pause_secs")]
    pub scoreboard_pause_secs: u64,

    #[serde(default = "default_round_secs")]
    pub round_secs: u64,

    #[serde(default = "default_mismatch_limit")]
    pub mismatch_limit: u32,

    /// Capacity of the inbound event bus.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            command_name: default_command_name(),
            default_card_size: default_card_size(),
            default_min_balance: default_min_balance(),
            join_window_secs: default_join_window_secs(),
            join_capacity: default_join_capacity(),
            scoreboard_pause_secs: default_scoreboard_pause_secs(),
            round_secs: default_round_secs(),
            mismatch_limit: default_mismatch_limit(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl GameConfig {
    /// The configured default size, or [`CardSize::Standard`] if it is not playable.
    pub fn card_size(&self) -> CardSize {
        CardSize::try_from(self.default_card_size).unwrap_or(CardSize::Standard)
    }

    pub fn min_balance(&self) -> MinBalance {
        MinBalance::from(self.default_min_balance)
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_command_name() -> String {
    "cringo".to_string()
}

fn default_card_size() -> u8 {
    4
}

fn default_min_balance() -> Option<f64> {
    Some(0.0)
}

fn default_join_window_secs() -> u64 {
    30
}

fn default_join_capacity() -> usize {
    20
}

fn default_scoreboard_pause_secs() -> u64 {
    5
}

fn default_round_secs() -> u64 {
    25
}

fn default_mismatch_limit() -> u32 {
    8
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

// =============================================================================
// Payout
// =============================================================================

/// `[payout]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Venue whose games pay the home bonus.
    #[serde(default)]
    pub home_venue: Option<VenueId>,

    #[serde(default = "default_home_bonus")]
    pub home_bonus: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            home_venue: None,
            home_bonus: default_home_bonus(),
        }
    }
}

fn default_home_bonus() -> f64 {
    1.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_rules() {
        let config = CringoConfig::default();
        assert_eq!(config.game_settings(), GameSettings::default());
        assert_eq!(config.game.card_size(), CardSize::Standard);
        assert_eq!(config.game.min_balance(), MinBalance::Amount(0.0));
    }

    #[test]
    fn test_unplayable_default_size_falls_back() {
        let mut config = GameConfig::default();
        config.default_card_size = 3;
        assert_eq!(config.card_size(), CardSize::Standard);

        config.default_card_size = 6;
        assert_eq!(config.card_size(), CardSize::Large);
    }
}
