//! Submission parsing, matching and line detection.
//!
//! Players answer a round by sending coordinates such as `b3 d1`. Each token
//! is judged on its own:
//!
//! | Token | Effect |
//! |-------|--------|
//! | `leave` | player leaves, remaining tokens are skipped |
//! | on-card coordinate holding a called symbol | +10 × multiplier, cell marked |
//! | any other coordinate | mismatch: the n-th one costs n points |
//! | anything else | ignored |
//!
//! The called set is cumulative for the whole game, so a symbol called in an
//! earlier round can still be claimed later, at the later round's multiplier.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use super::card::Position;
use super::phase::RoundState;
use super::session::PlayerSession;
use super::symbols::{CardSize, Symbol};

const MATCH_POINTS: i64 = 10;
const LINE_POINTS: i64 = 100;
const FULL_CARD_POINTS: i64 = 1000;

// ============================================================================
// Tokens
// ============================================================================

/// A parsed submission token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The player wants out.
    Leave,
    /// A coordinate on the card.
    Mark(Position),
    /// Letter + digit, but off the card.
    OutOfRange,
    /// Not a coordinate at all.
    Malformed,
}

/// Parses one whitespace-free token for a card of the given size.
///
/// The letter is case-insensitive. Tokens that are not exactly a letter
/// followed by a digit are [`Token::Malformed`].
pub fn parse_token(raw: &str, size: CardSize) -> Token {
    if raw.eq_ignore_ascii_case("leave") {
        return Token::Leave;
    }

    let mut chars = raw.chars();
    let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
        return Token::Malformed;
    };
    if !letter.is_ascii_alphabetic() {
        return Token::Malformed;
    }
    let Some(row) = digit.to_digit(10) else {
        return Token::Malformed;
    };

    let column = usize::from(letter.to_ascii_uppercase() as u8 - b'A') + 1;
    let row = row as usize;
    let n = size.n();
    if (1..=n).contains(&column) && (1..=n).contains(&row) {
        Token::Mark(Position::new(column, row))
    } else {
        Token::OutOfRange
    }
}

// ============================================================================
// Marking
// ============================================================================

/// Result of judging a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The cell held a called symbol and is now marked.
    Matched {
        position: Position,
        symbol: Symbol,
        points: i64,
    },
    /// The claim was wrong.
    Mismatched { token: String, penalty: i64 },
    /// Malformed token, no effect.
    Ignored,
    /// The player asked to leave.
    Leave,
}

impl MarkOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Judges one token against the player's card and the symbols called so far.
pub fn mark_card(
    player: &mut PlayerSession,
    token: &str,
    called: &HashSet<Symbol>,
    multiplier: u32,
) -> MarkOutcome {
    let position = match parse_token(token, player.card().size()) {
        Token::Leave => return MarkOutcome::Leave,
        Token::Malformed => return MarkOutcome::Ignored,
        Token::OutOfRange => return mismatch(player, token),
        Token::Mark(position) => position,
    };

    match player.card().symbol_at(position) {
        Some(symbol) if called.contains(symbol) => {
            player.card_mut().mark(position);
            let points = MATCH_POINTS * i64::from(multiplier);
            player.add_points(points);
            trace!(user = %player.user(), %position, symbol, points, "cell matched");
            MarkOutcome::Matched {
                position,
                symbol,
                points,
            }
        }
        _ => mismatch(player, token),
    }
}

/// Judges every whitespace-separated token of a message in order.
///
/// Stops right after a `leave` token; malformed tokens are dropped from the
/// result.
pub fn mark_message(
    player: &mut PlayerSession,
    content: &str,
    called: &HashSet<Symbol>,
    multiplier: u32,
) -> Vec<MarkOutcome> {
    let mut outcomes = Vec::new();
    for token in content.split_whitespace() {
        match mark_card(player, token, called, multiplier) {
            MarkOutcome::Ignored => {}
            MarkOutcome::Leave => {
                outcomes.push(MarkOutcome::Leave);
                break;
            }
            outcome => outcomes.push(outcome),
        }
    }
    outcomes
}

fn mismatch(player: &mut PlayerSession, token: &str) -> MarkOutcome {
    let penalty = player.record_mismatch();
    trace!(user = %player.user(), token, penalty, "mismatch");
    MarkOutcome::Mismatched {
        token: token.to_string(),
        penalty,
    }
}

// ============================================================================
// Lines
// ============================================================================

/// A line of cells that pays out once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Line {
    /// One-based row.
    Row(usize),
    /// One-based column.
    Column(usize),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
    /// Every row, column and diagonal.
    Full,
}

impl Line {
    /// Every row, column and diagonal of an N-wide card.
    pub fn all(n: usize) -> impl Iterator<Item = Line> {
        (1..=n)
            .map(Line::Row)
            .chain((1..=n).map(Line::Column))
            .chain([Line::Diagonal, Line::AntiDiagonal])
    }

    /// Positions covered by the line on an N-wide card.
    pub fn positions(self, n: usize) -> Vec<Position> {
        match self {
            Self::Row(row) => (1..=n).map(|column| Position::new(column, row)).collect(),
            Self::Column(column) => (1..=n).map(|row| Position::new(column, row)).collect(),
            Self::Diagonal => (1..=n).map(|i| Position::new(i, i)).collect(),
            Self::AntiDiagonal => (1..=n).map(|i| Position::new(n + 1 - i, i)).collect(),
            Self::Full => (1..=n)
                .flat_map(|row| (1..=n).map(move |column| Position::new(column, row)))
                .collect(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(row) => write!(f, "row {row}"),
            Self::Column(column) => write!(f, "column {}", CardSize::column_label(*column)),
            Self::Diagonal => f.write_str("diagonal"),
            Self::AntiDiagonal => f.write_str("anti-diagonal"),
            Self::Full => f.write_str("full card"),
        }
    }
}

/// Lines newly completed by one [`cringo_score`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineAward {
    /// Newly recorded rows, columns and diagonals.
    pub lines: Vec<Line>,
    /// Whether the full-card bonus fired.
    pub full: bool,
    /// Points added to the player's score.
    pub points: i64,
}

impl LineAward {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && !self.full
    }
}

/// End-of-round line check.
///
/// Records and pays 100 × multiplier for every row, column or diagonal that
/// is fully matched and not yet recorded. Once all 2N + 2 lines are
/// recorded, the full-card bonus of 1000 × multiplier is paid exactly once.
pub fn cringo_score(player: &mut PlayerSession, round: &RoundState) -> LineAward {
    let size = player.card().size();
    let n = size.n();
    let multiplier = i64::from(round.multiplier);
    let mut award = LineAward::default();

    for line in Line::all(n) {
        if player.completed_lines().contains(&line) {
            continue;
        }
        let complete = line
            .positions(n)
            .into_iter()
            .all(|position| player.card().is_matched(position));
        if complete && player.complete_line(line) {
            award.lines.push(line);
            award.points += LINE_POINTS * multiplier;
        }
    }

    if player.line_total() == size.line_count() && player.complete_line(Line::Full) {
        award.full = true;
        award.points += FULL_CARD_POINTS * multiplier;
    }

    if !award.is_empty() {
        player.add_points(award.points);
        trace!(
            user = %player.user(),
            round = round.number,
            lines = award.lines.len(),
            full = award.full,
            points = award.points,
            "lines completed"
        );
    }
    award
}
