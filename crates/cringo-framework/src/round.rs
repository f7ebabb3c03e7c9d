//! One timed round.
//!
//! A round runs in five steps:
//!
//! 1. post the scoreboard and pause
//! 2. draw one fresh symbol per column and send the call to every player
//! 3. judge private submissions until the round time runs out
//! 4. pay newly completed lines and remove players at the mismatch limit
//! 5. send every remaining player their score and card
//!
//! A player whose private messages stop arriving is removed on the spot with
//! a channel notice; the round goes on for everyone else.

use std::collections::{HashMap, HashSet};

use cringo_core::{
    CardGenerator, EventKind, GameResult, InboundEvent, MarkOutcome, RoundState, Symbol, UserId,
    cringo_score, mark_message,
};
use futures::future::join_all;
use rand::rngs::StdRng;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::bus::Subscription;
use crate::display;
use crate::game::GameContext;
use crate::table::{Seat, Table};

/// Why a player left the table mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The player sent `leave`.
    Left,
    /// A private message to the player failed.
    Unreachable,
    /// The player reached the mismatch limit.
    MismatchLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub user: UserId,
    pub reason: RemovalReason,
}

/// What happened in one round.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub round: RoundState,
    pub removed: Vec<Removal>,
}

/// Plays the rounds of one game, remembering every symbol called so far.
pub struct RoundEngine<'a> {
    ctx: &'a GameContext,
    rng: &'a mut StdRng,
    generator: CardGenerator,
    called: HashSet<Symbol>,
}

impl<'a> RoundEngine<'a> {
    pub fn new(ctx: &'a GameContext, rng: &'a mut StdRng) -> Self {
        Self {
            ctx,
            rng,
            generator: CardGenerator::new(ctx.request.size),
            called: HashSet::new(),
        }
    }

    /// Every symbol called in this game so far.
    pub fn called(&self) -> &HashSet<Symbol> {
        &self.called
    }

    /// Plays round `number` with the players at `table`.
    pub async fn play(
        &mut self,
        number: u32,
        table: &mut Table,
        subscription: &mut Subscription,
    ) -> GameResult<RoundSummary> {
        let ctx = self.ctx;
        let settings = &ctx.settings;
        let total = ctx.request.size.total_rounds();
        let mut removed = Vec::new();

        self.post(&display::scoreboard(number, total, table)).await;
        sleep(settings.scoreboard_pause).await;

        let call = self.generator.call(&mut *self.rng, &self.called)?;
        self.called.extend(call.iter().copied());
        let round = RoundState::new(number, total, call);
        info!(
            round = round.number,
            multiplier = round.multiplier,
            players = table.len(),
            "Round called"
        );

        let opened = Instant::now();
        let deadline = opened + settings.round_time;
        let call_text = display::round_call(&round, settings.round_time);
        let failed = self.deliver_all(table, |_| call_text.clone()).await;
        self.remove_unreachable(table, failed, &mut removed).await;

        while !table.is_empty() {
            let event = subscription
                .await_event(EventKind::Message, deadline, |event| {
                    event.received_at() >= opened
                        && event.direct_text().is_some()
                        && table.contains(event.user_id())
                })
                .await;
            let Some(event) = event else {
                break;
            };
            self.judge(&event, &round, table, &mut removed).await;
        }

        let mut awards = HashMap::new();
        for seat in table.iter_mut() {
            let award = cringo_score(seat.session_mut(), &round);
            if !award.is_empty() {
                awards.insert(seat.user().clone(), award);
            }
        }
        for seat in table.iter() {
            if let Some(award) = awards.get(seat.user()) {
                self.post(&display::lines_completed(seat.name(), award)).await;
            }
        }

        let limit = settings.mismatch_limit;
        let over_limit: Vec<UserId> = table
            .iter()
            .filter(|seat| seat.session().exceeds_mismatch_limit(limit))
            .map(|seat| seat.user().clone())
            .collect();
        for user in over_limit {
            let Some(seat) = table.remove(&user) else {
                continue;
            };
            info!(%user, limit, "Player removed at mismatch limit");
            let notice = display::mismatch_removed_private(limit);
            if let Err(e) = ctx.services.messenger.send_private(&user, &notice).await {
                debug!(%user, error = %e, "Removal notice not delivered");
            }
            self.post(&display::mismatch_removed(seat.name(), limit)).await;
            removed.push(Removal {
                user,
                reason: RemovalReason::MismatchLimit,
            });
        }

        let failed = self
            .deliver_all(table, |seat| {
                display::round_status(seat, &round, awards.get(seat.user()))
            })
            .await;
        self.remove_unreachable(table, failed, &mut removed).await;

        Ok(RoundSummary { round, removed })
    }

    /// Judges one private submission.
    async fn judge(
        &self,
        event: &InboundEvent,
        round: &RoundState,
        table: &mut Table,
        removed: &mut Vec<Removal>,
    ) {
        let user = event.user_id().clone();
        let (Some(content), Some(seat)) = (event.direct_text(), table.seat_mut(&user)) else {
            return;
        };

        let outcomes = mark_message(seat.session_mut(), content, &self.called, round.multiplier);
        if outcomes.last() == Some(&MarkOutcome::Leave) {
            if let Some(seat) = table.remove(&user) {
                info!(%user, "Player left");
                self.post(&display::player_left(seat.name())).await;
                removed.push(Removal {
                    user,
                    reason: RemovalReason::Left,
                });
            }
            return;
        }
        if outcomes.is_empty() {
            return;
        }

        let feedback = display::submission_feedback(&outcomes, seat.session().score());
        if let Err(e) = self
            .ctx
            .services
            .messenger
            .send_private(&user, &feedback)
            .await
        {
            debug!(%user, error = %e, "Feedback not delivered");
            self.remove_unreachable(table, vec![user], removed).await;
        }
    }

    /// Sends a private message to every seated player at once.
    ///
    /// Returns the players it could not reach.
    async fn deliver_all<F>(&self, table: &Table, render: F) -> Vec<UserId>
    where
        F: Fn(&Seat) -> String,
    {
        let messenger = &self.ctx.services.messenger;
        let deliveries = table.iter().map(|seat| {
            let user = seat.user().clone();
            let text = render(seat);
            async move {
                let result = messenger.send_private(&user, &text).await;
                (user, result)
            }
        });

        join_all(deliveries)
            .await
            .into_iter()
            .filter_map(|(user, result)| match result {
                Ok(_) => None,
                Err(e) => {
                    debug!(%user, error = %e, "Private delivery failed");
                    Some(user)
                }
            })
            .collect()
    }

    async fn remove_unreachable(
        &self,
        table: &mut Table,
        users: Vec<UserId>,
        removed: &mut Vec<Removal>,
    ) {
        for user in users {
            let Some(seat) = table.remove(&user) else {
                continue;
            };
            info!(%user, "Player unreachable, removed");
            self.post(&display::player_unreachable(seat.name())).await;
            removed.push(Removal {
                user,
                reason: RemovalReason::Unreachable,
            });
        }
    }

    async fn post(&self, text: &str) {
        self.ctx.announce(text).await;
    }
}
