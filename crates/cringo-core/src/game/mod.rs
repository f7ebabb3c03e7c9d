//! Game layer - the pure CRINGO! rules.
//!
//! - [`symbols`]: card sizes and the fixed per-column symbol pools
//! - [`card`]: the card grid and the card generator
//! - [`session`]: per-player mutable state
//! - [`scorer`]: submission parsing, matching and line detection
//! - [`economy`]: entry requirements and the payout formula
//! - [`phase`]: the game state machine and per-round state

pub mod card;
pub mod economy;
pub mod phase;
pub mod scorer;
pub mod session;
pub mod symbols;

pub use card::{Card, CardGenerator, Cell, Position};
pub use economy::{Award, MinBalance, Payout, compute_payouts, nerf};
pub use phase::{GamePhase, RoundState};
pub use scorer::{Line, LineAward, MarkOutcome, Token, cringo_score, mark_card, mark_message, parse_token};
pub use session::PlayerSession;
pub use symbols::{CardSize, JOIN_EMOJI, MATCHED_MARKER, Symbol};
