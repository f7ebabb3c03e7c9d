//! The seated players of one game.

use cringo_core::{Participant, PlayerSession, UserId};

use crate::roster::RosterClaim;

/// One seated player: who they are, their game state, and their roster claim.
///
/// Dropping a seat releases the player from the [`PlayingRoster`](crate::PlayingRoster).
#[derive(Debug)]
pub struct Seat {
    participant: Participant,
    session: PlayerSession,
    _claim: RosterClaim,
}

impl Seat {
    pub fn new(participant: Participant, session: PlayerSession, claim: RosterClaim) -> Self {
        debug_assert_eq!(claim.user(), &participant.id);
        Self {
            participant,
            session,
            _claim: claim,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.participant.id
    }

    pub fn name(&self) -> &str {
        &self.participant.name
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlayerSession {
        &mut self.session
    }
}

/// Seats in join order.
///
/// Join order is the seating order used for scoreboard ties and for the
/// payout winner tie-break.
#[derive(Debug, Default)]
pub struct Table {
    seats: Vec<Seat>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.seats.iter().any(|seat| seat.user() == user)
    }

    pub fn seat(&self, user: &UserId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.user() == user)
    }

    pub fn seat_mut(&mut self, user: &UserId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|seat| seat.user() == user)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.seats.iter_mut()
    }

    /// Seated users in join order.
    pub fn users(&self) -> Vec<UserId> {
        self.seats.iter().map(|seat| seat.user().clone()).collect()
    }

    /// Seats by score, highest first. Equal scores keep join order.
    pub fn standings(&self) -> Vec<&Seat> {
        let mut standings: Vec<&Seat> = self.seats.iter().collect();
        standings.sort_by_key(|seat| std::cmp::Reverse(seat.session().score()));
        standings
    }

    pub fn push(&mut self, seat: Seat) {
        debug_assert!(!self.contains(seat.user()));
        self.seats.push(seat);
    }

    /// Unseats a player, releasing their roster claim.
    pub fn remove(&mut self, user: &UserId) -> Option<Seat> {
        let index = self.seats.iter().position(|seat| seat.user() == user)?;
        Some(self.seats.remove(index))
    }
}
