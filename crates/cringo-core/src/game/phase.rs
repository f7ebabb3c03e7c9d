//! Game state machine and per-round state.
//!
//! ```text
//! JOINING ──▶ ROUND 1 ──▶ ROUND 2 ──▶ … ──▶ ROUND total ──▶ PAYOUT ──▶ DONE
//!    │                                                          ▲
//!    │            (roster empties mid-game) ────────────────────┘
//!    └──▶ CANCELLED   (nobody joined)
//! ```
//!
//! There are no backward transitions.

use std::fmt;

use super::symbols::Symbol;
use crate::foundation::{GameError, GameResult};

/// Where a game currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Joining,
    /// One-based round number.
    Round(u32),
    Payout,
    Done,
    Cancelled,
}

impl GamePhase {
    /// Whether `next` is a legal successor in a game of `total_rounds`.
    pub fn can_advance_to(self, next: GamePhase, total_rounds: u32) -> bool {
        match (self, next) {
            (Self::Joining, Self::Round(1)) => total_rounds >= 1,
            (Self::Joining, Self::Cancelled) => true,
            (Self::Round(current), Self::Round(following)) => {
                following == current + 1 && following <= total_rounds
            }
            (Self::Round(_), Self::Payout) => true,
            (Self::Payout, Self::Done) => true,
            _ => false,
        }
    }

    /// Returns `next` if the transition is legal.
    pub fn advance(self, next: GamePhase, total_rounds: u32) -> GameResult<GamePhase> {
        if self.can_advance_to(next, total_rounds) {
            Ok(next)
        } else {
            Err(GameError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joining => f.write_str("JOINING"),
            Self::Round(round) => write!(f, "ROUND[{round}]"),
            Self::Payout => f.write_str("PAYOUT"),
            Self::Done => f.write_str("DONE"),
            Self::Cancelled => f.write_str("CANCELLED"),
        }
    }
}

/// State of the round being played. Rebuilt every round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    /// One-based round number.
    pub number: u32,
    /// Rounds in the game.
    pub total: u32,
    /// Scoring weight: `total + 1 - number`, so the first round pays most.
    pub multiplier: u32,
    /// Symbols called this round, one per column.
    pub called: Vec<Symbol>,
}

impl RoundState {
    pub fn new(number: u32, total: u32, called: Vec<Symbol>) -> Self {
        debug_assert!((1..=total).contains(&number));
        Self {
            number,
            total,
            multiplier: (total + 1).saturating_sub(number),
            called,
        }
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_decays() {
        let multipliers: Vec<u32> = (1..=9)
            .map(|r| RoundState::new(r, 9, Vec::new()).multiplier)
            .collect();
        assert_eq!(multipliers, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert!(RoundState::new(9, 9, Vec::new()).is_last());
    }

    #[test]
    fn test_forward_transitions() {
        let total = 3;
        let mut phase = GamePhase::Joining;
        for next in [
            GamePhase::Round(1),
            GamePhase::Round(2),
            GamePhase::Round(3),
            GamePhase::Payout,
            GamePhase::Done,
        ] {
            phase = phase.advance(next, total).unwrap();
        }
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_rejected_transitions() {
        let total = 3;
        assert!(GamePhase::Joining.can_advance_to(GamePhase::Cancelled, total));
        assert!(GamePhase::Round(2).can_advance_to(GamePhase::Payout, total));
        assert!(!GamePhase::Round(2).can_advance_to(GamePhase::Round(1), total));
        assert!(!GamePhase::Round(3).can_advance_to(GamePhase::Round(4), total));
        assert!(!GamePhase::Round(1).can_advance_to(GamePhase::Cancelled, total));
        assert!(!GamePhase::Joining.can_advance_to(GamePhase::Payout, total));
        assert!(!GamePhase::Done.can_advance_to(GamePhase::Joining, total));

        let err = GamePhase::Payout.advance(GamePhase::Round(1), total).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid phase transition from PAYOUT to ROUND[1]"
        );
    }
}
