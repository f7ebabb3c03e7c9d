//! Entry requirements and the payout formula.
//!
//! Scores are converted into currency by dividing by the "nerf", a function
//! of the number of players still seated at the end:
//!
//! ```text
//! nerf(x) = 0.05·x² − 2.05·x + 52
//! ```
//!
//! Over the supported range of 1..=20 players the nerf falls from 50 to 31,
//! so it never reaches zero. Games hosted in the home venue divide by a
//! smaller nerf: `nerf × (2 − bonus)` with `bonus` in `[1, 2)`.

use serde::{Deserialize, Serialize};

use crate::foundation::UserId;

/// Largest roster the payout formula is defined for.
pub const MAX_PLAYERS: usize = 20;

/// Minimum balance a candidate must hold to join.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MinBalance {
    /// Anyone may join, even with a negative balance.
    #[default]
    NoMinimum,
    /// The balance must be at least this amount.
    Amount(f64),
}

impl MinBalance {
    /// Whether a candidate holding `balance` may join.
    pub fn admits(self, balance: f64) -> bool {
        match self {
            Self::NoMinimum => true,
            Self::Amount(minimum) => balance >= minimum,
        }
    }
}

impl From<Option<f64>> for MinBalance {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::NoMinimum, Self::Amount)
    }
}

/// Payout normalisation divisor for `players` finishers.
pub fn nerf(players: usize) -> f64 {
    let x = players as f64;
    0.05 * x * x - 2.05 * x + 52.0
}

/// One player's payout.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub user: UserId,
    pub score: i64,
    /// Negative when the score is negative; debits the balance.
    pub amount: f64,
}

/// Result of a payout computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    /// Divisor used, home bonus applied.
    pub nerf: f64,
    /// Awards in seating order.
    pub awards: Vec<Award>,
    /// First player holding the highest score.
    pub winner: Option<UserId>,
}

impl Payout {
    pub fn award_for(&self, user: &UserId) -> Option<&Award> {
        self.awards.iter().find(|award| &award.user == user)
    }
}

/// Converts final scores into awards.
///
/// `scores` must be in seating order; ties for the top score go to the
/// earliest seat. `home_bonus` is the configured bonus when the game ran in
/// the home venue.
pub fn compute_payouts<I>(scores: I, home_bonus: Option<f64>) -> Payout
where
    I: IntoIterator<Item = (UserId, i64)>,
{
    let scores: Vec<(UserId, i64)> = scores.into_iter().collect();
    debug_assert!(scores.len() <= MAX_PLAYERS);

    let mut divisor = nerf(scores.len());
    if let Some(bonus) = home_bonus {
        divisor *= 2.0 - bonus;
    }

    let mut winner: Option<(&UserId, i64)> = None;
    for (user, score) in &scores {
        if winner.is_none_or(|(_, best)| *score > best) {
            winner = Some((user, *score));
        }
    }
    let winner = winner.map(|(user, _)| user.clone());

    let awards = scores
        .into_iter()
        .map(|(user, score)| Award {
            user,
            score,
            amount: score as f64 / divisor,
        })
        .collect();

    Payout {
        nerf: divisor,
        awards,
        winner,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::{
        CardGenerator, CardSize, Line, PlayerSession, RoundState, cringo_score, mark_card,
    };

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_nerf_positive_on_supported_range() {
        for players in 1..=MAX_PLAYERS {
            assert!(nerf(players) > 0.0, "nerf({players}) must be positive");
        }
        assert!((nerf(1) - 50.0).abs() < EPSILON);
        assert!((nerf(20) - 31.0).abs() < EPSILON);
        // The vertex sits at x = 20.5, just past the range.
        assert!((nerf(21) - nerf(20)).abs() < 0.05 + EPSILON);
        assert!(nerf(20) < nerf(19));
    }

    #[test]
    fn test_home_bonus_shrinks_nerf() {
        let scores = vec![(UserId::new("a"), 100)];
        let away = compute_payouts(scores.clone(), None);
        let home = compute_payouts(scores, Some(1.25));

        assert!((home.nerf - away.nerf * 0.75).abs() < EPSILON);
        assert!(home.awards[0].amount > away.awards[0].amount);
    }

    #[test]
    fn test_winner_ties_go_to_first_seat() {
        let payout = compute_payouts(
            vec![
                (UserId::new("a"), 10),
                (UserId::new("b"), 40),
                (UserId::new("c"), 40),
            ],
            None,
        );
        assert_eq!(payout.winner, Some(UserId::new("b")));
        assert!(compute_payouts(Vec::new(), None).winner.is_none());
    }

    #[test]
    fn test_min_balance() {
        assert!(MinBalance::NoMinimum.admits(-500.0));
        assert!(MinBalance::Amount(10.0).admits(10.0));
        assert!(!MinBalance::Amount(10.0).admits(9.99));
        assert_eq!(MinBalance::from(None), MinBalance::NoMinimum);
    }

    #[test]
    fn test_three_player_scenario() {
        let size = CardSize::Standard;
        let mut rng = StdRng::seed_from_u64(21);
        let generator = CardGenerator::new(size);
        let mut seat =
            |id: &str| PlayerSession::new(UserId::new(id), generator.card(&mut rng).unwrap());
        let (mut a, mut b, c) = (seat("a"), seat("b"), seat("c"));
        let called = HashSet::new();

        // A mismatches twice over the game.
        mark_card(&mut a, "z1", &called, 9);
        mark_card(&mut a, "a9", &called, 6);

        // B completes row 1 in round 3 and nothing else.
        for position in Line::Row(1).positions(size.n()) {
            b.card_mut().mark(position);
        }
        let third = RoundState::new(3, size.total_rounds(), Vec::new());
        assert_eq!(third.multiplier, 7);
        cringo_score(&mut b, &third);

        assert_eq!(a.score(), -3);
        assert_eq!(b.score(), 700);
        assert_eq!(c.score(), 0);

        let payout = compute_payouts(
            [&a, &b, &c].map(|p| (p.user().clone(), p.score())),
            None,
        );

        assert!((payout.nerf - 46.3).abs() < EPSILON);
        let amount = |id: &str| payout.award_for(&UserId::new(id)).unwrap().amount;
        assert!((amount("a") - (-3.0 / 46.3)).abs() < EPSILON);
        assert!((amount("b") - 700.0 / 46.3).abs() < EPSILON);
        assert!((amount("b") - 15.12).abs() < 0.01);
        assert_eq!(amount("c"), 0.0);
        assert_eq!(payout.winner, Some(UserId::new("b")));
    }
}
