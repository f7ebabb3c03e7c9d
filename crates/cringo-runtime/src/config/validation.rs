//! Configuration validation utilities.

use cringo_core::CardSize;
use cringo_core::game::economy::MAX_PLAYERS;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CringoConfig, GameConfig, PayoutConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CringoConfig) -> ConfigResult<()> {
    validate_game_config(&config.game)?;
    validate_payout_config(&config.payout)?;
    Ok(())
}

fn validate_game_config(game: &GameConfig) -> ConfigResult<()> {
    if game.command_name.trim().is_empty() {
        return Err(ConfigError::missing_field("game.command_name"));
    }
    if game.command_name.contains(char::is_whitespace) {
        return Err(ConfigError::validation(
            "Command name cannot contain whitespace",
        ));
    }

    CardSize::try_from(game.default_card_size).map_err(|_| {
        ConfigError::validation(format!(
            "Unsupported default card size: {}. Valid values are 2, 4 and 6",
            game.default_card_size
        ))
    })?;

    if let Some(min) = game.default_min_balance
        && (!min.is_finite() || min < 0.0)
    {
        return Err(ConfigError::validation(format!(
            "Default minimum balance must be a non-negative number, got {min}"
        )));
    }

    if game.join_window_secs == 0 {
        return Err(ConfigError::validation(
            "Join window must be greater than 0",
        ));
    }
    if game.round_secs == 0 {
        return Err(ConfigError::validation("Round time must be greater than 0"));
    }

    // The payout divisor is only guaranteed positive up to MAX_PLAYERS.
    if game.join_capacity == 0 || game.join_capacity > MAX_PLAYERS {
        return Err(ConfigError::validation(format!(
            "Join capacity must be between 1 and {MAX_PLAYERS}, got {}",
            game.join_capacity
        )));
    }

    if game.mismatch_limit == 0 {
        return Err(ConfigError::validation(
            "Mismatch limit must be greater than 0",
        ));
    }

    if game.event_buffer == 0 {
        return Err(ConfigError::validation(
            "Event buffer must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_payout_config(payout: &PayoutConfig) -> ConfigResult<()> {
    if !(1.0..2.0).contains(&payout.home_bonus) {
        return Err(ConfigError::validation(format!(
            "Home bonus must be in [1.0, 2.0), got {}",
            payout.home_bonus
        )));
    }
    Ok(())
}
