//! Process-wide registry of users currently seated in a game.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use cringo_core::UserId;
use parking_lot::Mutex;
use tracing::trace;

/// Set of users seated at any table in this process.
///
/// Claims are atomic: of two games racing to seat the same user, exactly one
/// obtains a [`RosterClaim`]. The user is released when the claim is dropped,
/// which happens when their seat is removed or the game ends, however it
/// ends.
#[derive(Clone, Default)]
pub struct PlayingRoster {
    playing: Arc<Mutex<HashSet<UserId>>>,
}

impl PlayingRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `user` as playing, or returns `None` if they already are.
    pub fn try_claim(&self, user: &UserId) -> Option<RosterClaim> {
        let inserted = self.playing.lock().insert(user.clone());
        if !inserted {
            return None;
        }
        trace!(%user, "roster claimed");
        Some(RosterClaim {
            roster: self.clone(),
            user: user.clone(),
        })
    }

    /// Returns `true` if `user` is seated somewhere.
    pub fn contains(&self, user: &UserId) -> bool {
        self.playing.lock().contains(user)
    }

    /// Number of users seated across all games.
    pub fn len(&self) -> usize {
        self.playing.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.playing.lock().is_empty()
    }

    fn release(&self, user: &UserId) {
        self.playing.lock().remove(user);
        trace!(%user, "roster released");
    }
}

impl fmt::Debug for PlayingRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayingRoster")
            .field("playing", &self.len())
            .finish()
    }
}

/// Proof that a user is seated. Releases the user on drop.
#[derive(Debug)]
pub struct RosterClaim {
    roster: PlayingRoster,
    user: UserId,
}

impl RosterClaim {
    pub fn user(&self) -> &UserId {
        &self.user
    }
}

impl Drop for RosterClaim {
    fn drop(&mut self) {
        self.roster.release(&self.user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let roster = PlayingRoster::new();
        let user = UserId::new("1");

        let claim = roster.try_claim(&user).unwrap();
        assert!(roster.contains(&user));
        assert!(roster.try_claim(&user).is_none());
        assert_eq!(claim.user(), &user);

        drop(claim);
        assert!(!roster.contains(&user));
        assert!(roster.try_claim(&user).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let roster = PlayingRoster::new();
        let other = roster.clone();
        let _claim = roster.try_claim(&UserId::new("7")).unwrap();

        assert!(other.contains(&UserId::new("7")));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let roster = PlayingRoster::new();
        let user = UserId::new("racer");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let roster = roster.clone();
                let user = user.clone();
                std::thread::spawn(move || roster.try_claim(&user))
            })
            .collect();
        let claims: Vec<RosterClaim> = handles
            .into_iter()
            .filter_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(claims.len(), 1);
        assert!(roster.contains(&user));
    }
}
