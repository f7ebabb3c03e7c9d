//! Text of every message a game sends.

use std::time::Duration;

use cringo_core::{
    Card, JOIN_EMOJI, LineAward, MarkOutcome, MinBalance, Participant, Payout, RoundState,
};

use crate::join::BounceReason;
use crate::settings::{GameRequest, GameSettings};
use crate::table::{Seat, Table};

pub fn announcement(request: &GameRequest, settings: &GameSettings) -> String {
    let entry = match request.min_balance {
        MinBalance::NoMinimum => "anyone can play".to_string(),
        MinBalance::Amount(amount) => format!("minimum balance {amount:.2}"),
    };
    format!(
        "🎉 **CRINGO!** {} card hosted by {}, {}.\n\
         React with {JOIN_EMOJI} within {} seconds to join (up to {} players). \
         Your card arrives by private message.",
        request.size,
        request.host.name,
        entry,
        settings.join_window.as_secs(),
        settings.join_capacity,
    )
}

pub fn bounced(participant: &Participant, reason: &BounceReason) -> String {
    let why = match reason {
        BounceReason::Banned => "you are banned from playing".to_string(),
        BounceReason::InsufficientBalance { balance, required } => {
            format!("your balance {balance:.2} is below the required {required:.2}")
        }
        BounceReason::AlreadyPlaying => "you are already playing another game".to_string(),
        BounceReason::Unreachable => {
            "I cannot send you private messages, open your DMs and try again".to_string()
        }
        BounceReason::LedgerUnavailable => "your balance could not be checked".to_string(),
    };
    format!("{}, you can't join: {why}.", participant.name)
}

pub fn card_dealt(request: &GameRequest, settings: &GameSettings, card: &Card) -> String {
    format!(
        "You're in! Here is your {} card:\n\n{}\n\n\
         Each round I will call one symbol per column. Reply with the coordinates \
         of called symbols on your card, for example `b3 d1`. Wrong claims cost \
         points, and {} of them get you removed. Send `leave` to quit.",
        request.size, card, settings.mismatch_limit,
    )
}

pub fn roster_closed(table: &Table) -> String {
    let names: Vec<&str> = table.iter().map(Seat::name).collect();
    format!(
        "Joining is closed. {} player(s): {}. Good luck!",
        table.len(),
        names.join(", ")
    )
}

pub fn cancelled() -> String {
    "Nobody joined, the CRINGO! game is cancelled.".to_string()
}

pub fn scoreboard(round: u32, total: u32, table: &Table) -> String {
    let mut text = format!("📋 **Scoreboard**, round {round} of {total} is next:\n");
    for (rank, seat) in table.standings().into_iter().enumerate() {
        text.push_str(&format!(
            "{}. {}: {}\n",
            rank + 1,
            seat.name(),
            seat.session().score()
        ));
    }
    text
}

pub fn round_call(round: &RoundState, round_time: Duration) -> String {
    format!(
        "**Round {} of {}** (×{}): {}\nYou have {} seconds.",
        round.number,
        round.total,
        round.multiplier,
        round.called.join("  "),
        round_time.as_secs(),
    )
}

pub fn submission_feedback(outcomes: &[MarkOutcome], score: i64) -> String {
    let mut text = String::new();
    for outcome in outcomes {
        match outcome {
            MarkOutcome::Matched {
                position,
                symbol,
                points,
            } => {
                text.push_str(&format!("✅ {position} {symbol} +{points}\n"));
            }
            MarkOutcome::Mismatched { token, penalty } => {
                text.push_str(&format!("❌ {token} -{penalty}\n"));
            }
            MarkOutcome::Ignored | MarkOutcome::Leave => {}
        }
    }
    text.push_str(&format!("Score: {score}"));
    text
}

pub fn lines_completed(name: &str, award: &LineAward) -> String {
    let lines: Vec<String> = award.lines.iter().map(ToString::to_string).collect();
    let mut text = format!("🎯 {name} completed {}", lines.join(", "));
    if award.full {
        text.push_str(" and the FULL CARD");
    }
    text.push_str(&format!(" for {} points! CRINGO!", award.points));
    text
}

pub fn player_left(name: &str) -> String {
    format!("👋 {name} left the game.")
}

pub fn player_unreachable(name: &str) -> String {
    format!("📪 {name} can no longer receive private messages and was removed.")
}

pub fn mismatch_removed(name: &str, limit: u32) -> String {
    format!("🚫 {name} made {limit} wrong claims and was removed.")
}

pub fn mismatch_removed_private(limit: u32) -> String {
    format!("You made {limit} wrong claims and have been removed from the game.")
}

pub fn round_status(seat: &Seat, round: &RoundState, award: Option<&LineAward>) -> String {
    let session = seat.session();
    let mut text = format!("End of round {} of {}.", round.number, round.total);
    if let Some(award) = award {
        let lines: Vec<String> = award.lines.iter().map(ToString::to_string).collect();
        text.push_str(&format!(" CRINGO! {} +{}", lines.join(", "), award.points));
        if award.full {
            text.push_str(" (full card)");
        }
    }
    format!(
        "{text}\nScore: {}, mismatches: {}.\n\n{}",
        session.score(),
        session.mismatches(),
        session.card(),
    )
}

pub fn results(payout: &Payout, table: &Table) -> String {
    let mut text = "🏁 **CRINGO! is over.**\n".to_string();
    for seat in table.standings() {
        let amount = payout
            .award_for(seat.user())
            .map_or(0.0, |award| award.amount);
        let crown = if payout.winner.as_ref() == Some(seat.user()) {
            "👑 "
        } else {
            ""
        };
        text.push_str(&format!(
            "{crown}{}: {} points, {amount:+.2}\n",
            seat.name(),
            seat.session().score()
        ));
    }
    text
}

pub fn everyone_left() -> String {
    "Every player is gone, ending the game early.".to_string()
}
