//! The join window.
//!
//! Players join by reacting to the game announcement with [`JOIN_EMOJI`].
//! Each candidate is checked in order:
//!
//! 1. bots, repeat reactions and anyone arriving after the table is full are ignored
//! 2. banned users are bounced
//! 3. the balance must satisfy the game's [`MinBalance`]
//! 4. the user must not be seated at another table
//! 5. the card must reach them privately
//!
//! Only a candidate that passes every step takes a seat. A failed card
//! delivery releases the roster claim taken in step 4.
//!
//! Platforms may drop reaction events, so when the window closes the
//! announcement's reactions are fetched once and anyone not yet seen is
//! evaluated as if their event had arrived.

use std::collections::HashSet;

use cringo_core::game::economy::MAX_PLAYERS;
use cringo_core::{
    CardGenerator, EventKind, GameResult, JOIN_EMOJI, MessageId, MinBalance, Participant,
    PlayerSession, UserId,
};
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::bus::Subscription;
use crate::display;
use crate::game::GameContext;
use crate::table::{Seat, Table};

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq)]
pub enum BounceReason {
    Banned,
    InsufficientBalance { balance: f64, required: f64 },
    AlreadyPlaying,
    /// The card could not be delivered privately.
    Unreachable,
    /// The balance could not be read.
    LedgerUnavailable,
}

/// Result of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Accepted,
    Bounced(BounceReason),
    Ignored,
}

/// Runs one game's join window and builds its [`Table`].
pub struct JoinCoordinator<'a> {
    ctx: &'a GameContext,
    rng: &'a mut StdRng,
    generator: CardGenerator,
    table: Table,
    seen: HashSet<UserId>,
}

impl<'a> JoinCoordinator<'a> {
    pub fn new(ctx: &'a GameContext, rng: &'a mut StdRng) -> Self {
        Self {
            ctx,
            rng,
            generator: CardGenerator::new(ctx.request.size),
            table: Table::new(),
            seen: HashSet::new(),
        }
    }

    /// Seats available at this table.
    pub fn capacity(&self) -> usize {
        self.ctx.settings.join_capacity.min(MAX_PLAYERS)
    }

    pub fn is_full(&self) -> bool {
        self.table.len() >= self.capacity()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Collects joins until the table is full or the window expires, then
    /// closes the window.
    pub async fn run(
        mut self,
        subscription: &mut Subscription,
        announcement: &MessageId,
    ) -> GameResult<Table> {
        let ctx = self.ctx;
        let deadline = Instant::now() + ctx.settings.join_window;

        while !self.is_full() {
            let event = subscription
                .await_event(EventKind::Reaction, deadline, |event| {
                    event.channel() == &ctx.request.channel
                        && event.is_reaction_to(announcement, JOIN_EMOJI)
                })
                .await;
            let Some(event) = event else {
                break;
            };
            self.evaluate_candidate(event.participant()).await?;
        }

        self.close_window(announcement).await
    }

    /// Ends the window, seating anyone whose reaction event never arrived.
    pub async fn close_window(mut self, announcement: &MessageId) -> GameResult<Table> {
        if !self.is_full() {
            let messenger = &self.ctx.services.messenger;
            match messenger
                .reactions(&self.ctx.request.channel, announcement, JOIN_EMOJI)
                .await
            {
                Ok(reactors) => {
                    for reactor in reactors {
                        if self.is_full() {
                            break;
                        }
                        if reactor.is_bot || self.seen.contains(&reactor.id) {
                            continue;
                        }
                        debug!(user = %reactor.id, "Reconciling missed join reaction");
                        self.evaluate_candidate(&reactor).await?;
                    }
                }
                Err(e) => warn!(error = %e, "Could not fetch join reactions"),
            }
        }

        info!(players = self.table.len(), "Join window closed");
        Ok(self.table)
    }

    /// Decides whether `candidate` takes a seat.
    pub async fn evaluate_candidate(&mut self, candidate: &Participant) -> GameResult<JoinOutcome> {
        if candidate.is_bot || self.is_full() || !self.seen.insert(candidate.id.clone()) {
            return Ok(JoinOutcome::Ignored);
        }

        let ctx = self.ctx;
        let services = &ctx.services;
        let user = &candidate.id;

        if services.moderation.is_banned(user).await {
            return Ok(self.bounce(candidate, BounceReason::Banned).await);
        }

        if let MinBalance::Amount(required) = ctx.request.min_balance {
            match services.ledger.balance(user).await {
                Ok(balance) if balance >= required => {}
                Ok(balance) => {
                    let reason = BounceReason::InsufficientBalance { balance, required };
                    return Ok(self.bounce(candidate, reason).await);
                }
                Err(e) => {
                    warn!(%user, error = %e, "Balance lookup failed");
                    return Ok(self.bounce(candidate, BounceReason::LedgerUnavailable).await);
                }
            }
        }

        let Some(claim) = services.roster.try_claim(user) else {
            return Ok(self.bounce(candidate, BounceReason::AlreadyPlaying).await);
        };

        let card = self.generator.card(&mut *self.rng)?;
        let dealt = display::card_dealt(&ctx.request, &ctx.settings, &card);
        if let Err(e) = services.messenger.send_private(user, &dealt).await {
            debug!(%user, error = %e, "Card delivery failed");
            drop(claim);
            return Ok(self.bounce(candidate, BounceReason::Unreachable).await);
        }

        let session = PlayerSession::new(user.clone(), card);
        self.table.push(Seat::new(candidate.clone(), session, claim));
        info!(%user, players = self.table.len(), "Player joined");
        Ok(JoinOutcome::Accepted)
    }

    async fn bounce(&self, candidate: &Participant, reason: BounceReason) -> JoinOutcome {
        info!(user = %candidate.id, ?reason, "Join bounced");
        self.ctx
            .announce(&display::bounced(candidate, &reason))
            .await;
        JoinOutcome::Bounced(reason)
    }
}
