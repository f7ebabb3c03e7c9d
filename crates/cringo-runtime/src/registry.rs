//! Registry of the games running in each channel.
//!
//! A channel hosts at most one game. Claiming a channel yields a
//! [`GameLease`]; the channel is free again once the lease is dropped, which
//! the runtime ties to the end of the game task.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cringo_core::{CardSize, ChannelId, UserId};
use cringo_framework::PlayingRoster;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// What the registry knows about a running game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub size: CardSize,
    pub host: UserId,
    pub started: Instant,
}

/// Channel → running game, shared by every clone.
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<ChannelId, GameRecord>>>,
    roster: PlayingRoster,
}

impl GameRegistry {
    /// Creates a registry reporting seated players from `roster`.
    pub fn new(roster: PlayingRoster) -> Self {
        Self {
            games: Arc::default(),
            roster,
        }
    }

    /// Reserves `channel`, or returns `None` if it already hosts a game.
    pub fn try_claim(
        &self,
        channel: &ChannelId,
        size: CardSize,
        host: &UserId,
    ) -> Option<GameLease> {
        let mut games = self.games.lock();
        if games.contains_key(channel) {
            return None;
        }
        games.insert(
            channel.clone(),
            GameRecord {
                size,
                host: host.clone(),
                started: Instant::now(),
            },
        );
        debug!(%channel, %host, "Channel claimed");
        Some(GameLease {
            registry: self.clone(),
            channel: channel.clone(),
        })
    }

    pub fn is_active(&self, channel: &ChannelId) -> bool {
        self.games.lock().contains_key(channel)
    }

    pub fn get(&self, channel: &ChannelId) -> Option<GameRecord> {
        self.games.lock().get(channel).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            games: self.games.lock().len(),
            players: self.roster.len(),
        }
    }

    fn release(&self, channel: &ChannelId) {
        self.games.lock().remove(channel);
        debug!(%channel, "Channel released");
    }
}

impl fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Holds a channel for one game. Frees the channel on drop.
#[derive(Debug)]
pub struct GameLease {
    registry: GameRegistry,
    channel: ChannelId,
}

impl GameLease {
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }
}

impl Drop for GameLease {
    fn drop(&mut self) {
        self.registry.release(&self.channel);
    }
}

/// Snapshot of the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Channels with a running game.
    pub games: usize,
    /// Users seated at any table.
    pub players: usize,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Games: {} active, {} players seated", self.games, self.players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_game_per_channel() {
        let registry = GameRegistry::default();
        let channel = ChannelId::new("general");
        let host = UserId::new("host");

        let lease = registry.try_claim(&channel, CardSize::Standard, &host);
        assert!(lease.is_some());
        assert!(registry.try_claim(&channel, CardSize::Small, &host).is_none());
        assert_eq!(
            registry.get(&channel).map(|r| r.size),
            Some(CardSize::Standard)
        );

        let other = registry.try_claim(&ChannelId::new("random"), CardSize::Small, &host);
        assert!(other.is_some());
        assert_eq!(registry.stats().games, 2);

        drop(lease);
        assert!(!registry.is_active(&channel));
        assert!(registry.try_claim(&channel, CardSize::Large, &host).is_some());
    }

    #[test]
    fn test_stats_count_seated_players() {
        let roster = PlayingRoster::new();
        let registry = GameRegistry::new(roster.clone());
        let _a = roster.try_claim(&UserId::new("a"));
        let _b = roster.try_claim(&UserId::new("b"));
        let _lease = registry.try_claim(&ChannelId::new("c"), CardSize::Small, &UserId::new("a"));

        let stats = registry.stats();
        assert_eq!(stats, RegistryStats { games: 1, players: 2 });
        assert_eq!(stats.to_string(), "Games: 1 active, 2 players seated");
    }
}
