//! Card sizes and the fixed symbol pools.
//!
//! Six columns of fifteen emoji each. The columns are pairwise disjoint, so a
//! symbol identifies its column and no card can hold the same symbol twice.
//! A size-N game uses the first N columns, each truncated to the size's pool
//! depth.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::{GameError, GameResult};

/// A game symbol.
pub type Symbol = &'static str;

/// Reaction users add to the announcement to join a game.
pub const JOIN_EMOJI: &str = "🎲";

/// Replaces a symbol on a card once it has been matched.
pub const MATCHED_MARKER: &str = "✅";

/// Column labels, also the letter part of a submission token.
pub(crate) const COLUMN_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

const POOL_DEPTH: usize = 15;

const POOLS: [[Symbol; POOL_DEPTH]; 6] = [
    [
        "😀", "😂", "😎", "🤔", "😴", "😡", "🥶", "🤡", "👻", "💀", "🤖", "👽", "😇", "🥳", "🤯",
    ],
    [
        "🐶", "🐱", "🐭", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵", "🐔",
    ],
    [
        "🍎", "🍌", "🍇", "🍉", "🍒", "🍑", "🍍", "🥝", "🍕", "🍔", "🌭", "🌮", "🍩", "🍪", "🧀",
    ],
    [
        "⚽", "🏀", "🏈", "🎾", "🏐", "🎱", "🏓", "🥊", "🎯", "🪁", "🎳", "🛹", "🥌", "🏹", "🎣",
    ],
    [
        "🌵", "🌲", "🌻", "🍄", "🌈", "🌙", "🔥", "🌊", "⛄", "🌋", "🍁", "🌸", "🌍", "⚡", "🌪",
    ],
    [
        "🚗", "🚕", "🚌", "🚑", "🚒", "🚜", "🚲", "🛵", "🚂", "🚀", "🛸", "🚁", "⛵", "🚢", "🛶",
    ],
];

/// Supported card sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CardSize {
    /// 2×2, a quick game.
    Small,
    /// 4×4, the only size that records statistics.
    Standard,
    /// 6×6.
    Large,
}

impl CardSize {
    /// All playable sizes, smallest first.
    pub const ALL: [CardSize; 3] = [CardSize::Small, CardSize::Standard, CardSize::Large];

    /// Grid width N.
    pub fn n(self) -> usize {
        match self {
            Self::Small => 2,
            Self::Standard => 4,
            Self::Large => 6,
        }
    }

    /// Number of symbols in each column pool for this size.
    pub fn pool_depth(self) -> usize {
        match self {
            Self::Small => 6,
            Self::Standard => 12,
            Self::Large => POOL_DEPTH,
        }
    }

    /// Rounds played with this size. Never exceeds the pool depth, since every
    /// round consumes one symbol per column.
    pub fn total_rounds(self) -> u32 {
        match self {
            Self::Small => 5,
            Self::Standard => 9,
            Self::Large => 12,
        }
    }

    /// Rows, columns and both diagonals: 2N + 2.
    pub fn line_count(self) -> usize {
        2 * self.n() + 2
    }

    /// Whether games of this size feed the persistent play/win statistics.
    pub fn records_stats(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// The symbol pools in play for this size, one slice per column.
    pub fn pools(self) -> impl Iterator<Item = &'static [Symbol]> {
        let depth = self.pool_depth();
        POOLS.iter().take(self.n()).map(move |column| &column[..depth])
    }

    /// Label of a one-based column.
    pub fn column_label(column: usize) -> char {
        COLUMN_LABELS[column - 1]
    }
}

impl TryFrom<u8> for CardSize {
    type Error = GameError;

    fn try_from(n: u8) -> GameResult<Self> {
        match n {
            2 => Ok(Self::Small),
            4 => Ok(Self::Standard),
            6 => Ok(Self::Large),
            other => Err(GameError::UnsupportedCardSize(other)),
        }
    }
}

impl From<CardSize> for u8 {
    fn from(size: CardSize) -> u8 {
        size.n() as u8
    }
}

impl FromStr for CardSize {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(Self::Small),
            "standard" | "normal" | "m" => Ok(Self::Standard),
            "large" | "big" | "l" => Ok(Self::Large),
            other => other
                .parse::<u8>()
                .map_err(|_| GameError::UnsupportedCardSize(0))
                .and_then(Self::try_from),
        }
    }
}

impl fmt::Display for CardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}×{0}", self.n())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_pools_are_disjoint() {
        let all: Vec<Symbol> = POOLS.iter().flatten().copied().collect();
        let unique: HashSet<Symbol> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
        assert!(!unique.contains(MATCHED_MARKER));
        assert!(!unique.contains(JOIN_EMOJI));
    }

    #[test]
    fn test_rounds_fit_pool_depth() {
        for size in CardSize::ALL {
            assert!(size.total_rounds() as usize <= size.pool_depth());
            assert!(size.n() <= size.pool_depth());
            assert_eq!(size.pools().count(), size.n());
            assert!(size.pools().all(|pool| pool.len() == size.pool_depth()));
        }
    }

    #[test]
    fn test_parse_sizes() {
        assert_eq!("4".parse::<CardSize>().unwrap(), CardSize::Standard);
        assert_eq!("Large".parse::<CardSize>().unwrap(), CardSize::Large);
        assert_eq!(CardSize::try_from(2).unwrap(), CardSize::Small);
        assert!(matches!(
            CardSize::try_from(3),
            Err(GameError::UnsupportedCardSize(3))
        ));
        assert!("huge".parse::<CardSize>().is_err());
    }

    #[test]
    fn test_only_standard_records_stats() {
        assert!(CardSize::Standard.records_stats());
        assert!(!CardSize::Small.records_stats());
        assert!(!CardSize::Large.records_stats());
    }
}
