//! Cards and the card generator.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use super::symbols::{CardSize, MATCHED_MARKER, Symbol};
use crate::foundation::{GameError, GameResult};

// ============================================================================
// Cells and Positions
// ============================================================================

/// One cell of the (N+1)×(N+1) card grid.
///
/// Row 0 and column 0 are display-only headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Top-left corner.
    Corner,
    /// Header of a column (row 0).
    ColumnLabel(char),
    /// Header of a row (column 0).
    RowLabel(u8),
    /// An unmatched game symbol.
    Symbol(Symbol),
    /// A symbol that has been matched.
    Matched,
}

impl Cell {
    /// Text shown for this cell.
    pub fn display(&self) -> String {
        match self {
            Self::Corner => "▪️".to_string(),
            Self::ColumnLabel(label) => format!(" {label}"),
            Self::RowLabel(label) => format!("{label} "),
            Self::Symbol(symbol) => (*symbol).to_string(),
            Self::Matched => MATCHED_MARKER.to_string(),
        }
    }
}

/// A one-based card coordinate: column `A` is 1, row `1` is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub column: usize,
    pub row: usize,
}

impl Position {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CardSize::column_label(self.column), self.row)
    }
}

// ============================================================================
// Card
// ============================================================================

/// A player's grid of symbols.
///
/// Every non-header cell holds a symbol from its column's pool, and no symbol
/// appears twice. Cells are replaced by [`Cell::Matched`] as the player
/// scores; the grid is never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    size: CardSize,
    grid: Vec<Vec<Cell>>,
}

impl Card {
    /// Builds a card from N rows of N symbols, adding the header row and
    /// column.
    pub fn from_rows(size: CardSize, rows: Vec<Vec<Symbol>>) -> Self {
        let n = size.n();
        debug_assert_eq!(rows.len(), n);

        let mut grid = Vec::with_capacity(n + 1);

        let mut header = Vec::with_capacity(n + 1);
        header.push(Cell::Corner);
        header.extend((1..=n).map(|c| Cell::ColumnLabel(CardSize::column_label(c))));
        grid.push(header);

        for (index, symbols) in rows.into_iter().enumerate() {
            debug_assert_eq!(symbols.len(), n);
            let mut row = Vec::with_capacity(n + 1);
            row.push(Cell::RowLabel(index as u8 + 1));
            row.extend(symbols.into_iter().map(Cell::Symbol));
            grid.push(row);
        }

        Self { size, grid }
    }

    /// The card size.
    pub fn size(&self) -> CardSize {
        self.size
    }

    /// All grid rows, headers included.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    /// Returns `true` if the position addresses a playable cell.
    pub fn contains(&self, position: Position) -> bool {
        let n = self.size.n();
        (1..=n).contains(&position.column) && (1..=n).contains(&position.row)
    }

    /// Returns the cell at a playable position.
    pub fn cell(&self, position: Position) -> Option<Cell> {
        if !self.contains(position) {
            return None;
        }
        Some(self.grid[position.row][position.column])
    }

    /// Returns the unmatched symbol at a position.
    pub fn symbol_at(&self, position: Position) -> Option<Symbol> {
        match self.cell(position)? {
            Cell::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Returns `true` if the cell at the position has been matched.
    pub fn is_matched(&self, position: Position) -> bool {
        matches!(self.cell(position), Some(Cell::Matched))
    }

    /// Replaces the symbol at a position with the matched marker.
    ///
    /// Returns the symbol that was replaced, `None` if the cell held no
    /// symbol.
    pub fn mark(&mut self, position: Position) -> Option<Symbol> {
        let symbol = self.symbol_at(position)?;
        self.grid[position.row][position.column] = Cell::Matched;
        Some(symbol)
    }

    /// Iterates the unmatched symbols on the card.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.grid.iter().flatten().filter_map(|cell| match cell {
            Cell::Symbol(symbol) => Some(*symbol),
            _ => None,
        })
    }

    /// Renders the card as lines of text, headers included.
    pub fn render(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().map(Cell::display).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// Card Generator
// ============================================================================

/// Draws symbols for cards and for each round's call.
///
/// Every column pool is sampled independently without replacement, then the
/// per-column draws are transposed into rows. Symbols in the exclusion set are
/// never drawn, so feeding the game's accumulated called set back in keeps a
/// whole game free of repeats.
#[derive(Debug, Clone, Copy)]
pub struct CardGenerator {
    size: CardSize,
}

impl CardGenerator {
    pub fn new(size: CardSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> CardSize {
        self.size
    }

    /// Draws `rows` rows of N symbols, skipping everything in `exclude`.
    ///
    /// # Errors
    ///
    /// [`GameError::PoolExhausted`] when a column has fewer than `rows`
    /// unused symbols left.
    pub fn draw<R>(
        &self,
        rng: &mut R,
        rows: usize,
        exclude: &HashSet<Symbol>,
    ) -> GameResult<Vec<Vec<Symbol>>>
    where
        R: Rng + ?Sized,
    {
        let mut columns = Vec::with_capacity(self.size.n());
        for (column, pool) in self.size.pools().enumerate() {
            let mut candidates: Vec<Symbol> = pool
                .iter()
                .copied()
                .filter(|symbol| !exclude.contains(symbol))
                .collect();

            if candidates.len() < rows {
                return Err(GameError::PoolExhausted {
                    column,
                    requested: rows,
                    available: candidates.len(),
                });
            }

            let (picked, _) = candidates.partial_shuffle(rng, rows);
            columns.push(picked.to_vec());
        }

        Ok((0..rows)
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect())
    }

    /// Draws one symbol per column for a round, excluding symbols already
    /// called in this game.
    pub fn call<R>(&self, rng: &mut R, called: &HashSet<Symbol>) -> GameResult<Vec<Symbol>>
    where
        R: Rng + ?Sized,
    {
        let mut rows = self.draw(rng, 1, called)?;
        Ok(rows.pop().unwrap_or_default())
    }

    /// Generates a fresh card.
    pub fn card<R>(&self, rng: &mut R) -> GameResult<Card>
    where
        R: Rng + ?Sized,
    {
        let rows = self.draw(rng, self.size.n(), &HashSet::new())?;
        Ok(Card::from_rows(self.size, rows))
    }
}
