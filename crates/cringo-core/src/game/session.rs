//! Per-player game state.

use std::collections::BTreeSet;

use super::card::Card;
use super::scorer::Line;
use crate::foundation::UserId;

/// Mutable record of one participant for the duration of a game.
///
/// Created once the participant passes join eligibility and dropped when they
/// leave, become unreachable or hit the mismatch limit. Sessions are never
/// resurrected within a game.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    user: UserId,
    card: Card,
    score: i64,
    completed: BTreeSet<Line>,
    mismatches: u32,
}

impl PlayerSession {
    pub fn new(user: UserId, card: Card) -> Self {
        Self {
            user,
            card,
            score: 0,
            completed: BTreeSet::new(),
            mismatches: 0,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn card_mut(&mut self) -> &mut Card {
        &mut self.card
    }

    /// Running score. Goes negative when mismatches outweigh matches.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Lines recorded so far, including [`Line::Full`].
    pub fn completed_lines(&self) -> &BTreeSet<Line> {
        &self.completed
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    /// Returns `true` once the mismatch count reaches `limit`.
    pub fn exceeds_mismatch_limit(&self, limit: u32) -> bool {
        self.mismatches >= limit
    }

    pub(crate) fn add_points(&mut self, points: i64) {
        self.score += points;
    }

    /// Counts a mismatch and charges it. The n-th mismatch costs n points.
    ///
    /// Returns the penalty charged.
    pub(crate) fn record_mismatch(&mut self) -> i64 {
        self.mismatches += 1;
        let penalty = i64::from(self.mismatches);
        self.score -= penalty;
        penalty
    }

    /// Records a completed line. Returns `false` if it was already recorded.
    pub(crate) fn complete_line(&mut self, line: Line) -> bool {
        self.completed.insert(line)
    }

    /// Number of recorded rows, columns and diagonals.
    pub(crate) fn line_total(&self) -> usize {
        self.completed
            .iter()
            .filter(|line| !matches!(line, Line::Full))
            .count()
    }
}
