//! Per-game parameters.

use std::time::Duration;

use cringo_core::{CardSize, ChannelId, MinBalance, Participant, VenueId};
use cringo_core::game::economy::MAX_PLAYERS;

/// Timing and limits shared by every game a host runs.
///
/// Built by the runtime from its configuration; [`Default`] carries the
/// standard rules.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    /// How long the join window stays open.
    pub join_window: Duration,
    /// Seats per table. Never above [`MAX_PLAYERS`].
    pub join_capacity: usize,
    /// Pause after the scoreboard, before each round's call.
    pub scoreboard_pause: Duration,
    /// How long players have to submit claims each round.
    pub round_time: Duration,
    /// Mismatches after which a player is removed.
    pub mismatch_limit: u32,
    /// Venue whose games pay the home bonus.
    pub home_venue: Option<VenueId>,
    /// Home bonus, in `[1.0, 2.0)`.
    pub home_bonus: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            join_window: Duration::from_secs(30),
            join_capacity: MAX_PLAYERS,
            scoreboard_pause: Duration::from_secs(5),
            round_time: Duration::from_secs(25),
            mismatch_limit: 8,
            home_venue: None,
            home_bonus: 1.25,
        }
    }
}

/// A request to host one game, as issued by the `cringo` command.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRequest {
    /// Channel the game is announced and played in.
    pub channel: ChannelId,
    /// Venue of the channel, if any.
    pub venue: Option<VenueId>,
    /// Who asked for the game.
    pub host: Participant,
    pub size: CardSize,
    pub min_balance: MinBalance,
}

impl GameRequest {
    pub fn new(channel: impl Into<ChannelId>, host: Participant) -> Self {
        Self {
            channel: channel.into(),
            venue: None,
            host,
            size: CardSize::Standard,
            min_balance: MinBalance::NoMinimum,
        }
    }

    pub fn with_venue(mut self, venue: impl Into<VenueId>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_size(mut self, size: CardSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_min_balance(mut self, min_balance: MinBalance) -> Self {
        self.min_balance = min_balance;
        self
    }

    /// The home bonus to apply, if this game runs in the home venue.
    pub fn home_bonus(&self, settings: &GameSettings) -> Option<f64> {
        match (&self.venue, &settings.home_venue) {
            (Some(venue), Some(home)) if venue == home => Some(settings.home_bonus),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_bonus_only_in_home_venue() {
        let settings = GameSettings {
            home_venue: Some(VenueId::new("home")),
            ..GameSettings::default()
        };
        let host = Participant::new("h", "host");

        let home = GameRequest::new("c", host.clone()).with_venue("home");
        let away = GameRequest::new("c", host.clone()).with_venue("elsewhere");
        let nowhere = GameRequest::new("c", host);

        assert_eq!(home.home_bonus(&settings), Some(1.25));
        assert_eq!(away.home_bonus(&settings), None);
        assert_eq!(nowhere.home_bonus(&settings), None);
        assert_eq!(home.home_bonus(&GameSettings::default()), None);
    }
}
