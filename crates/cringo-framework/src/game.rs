//! The game orchestrator.
//!
//! [`CringoGame`] owns one game from announcement to payout and walks the
//! [`GamePhase`] state machine:
//!
//! 1. announce in the channel and add the join reaction
//! 2. run the join window; cancel if nobody joined
//! 3. play every round, stopping early once the table is empty
//! 4. convert the final scores into currency and credit every finisher
//!
//! Roster claims are tied to seats, so they are released whichever way the
//! game ends, errors included.

use cringo_core::{GamePhase, GameResult, JOIN_EMOJI, Payout, UserId, compute_payouts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Instrument, Level, debug, error, info, span, warn};

use crate::bus::Subscription;
use crate::display;
use crate::join::JoinCoordinator;
use crate::platform::GameServices;
use crate::round::{Removal, RoundEngine};
use crate::settings::{GameRequest, GameSettings};
use crate::table::Table;

/// What a game is played with: its collaborators, rules and request.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub services: GameServices,
    pub settings: GameSettings,
    pub request: GameRequest,
}

impl GameContext {
    pub fn new(services: GameServices, settings: GameSettings, request: GameRequest) -> Self {
        Self {
            services,
            settings,
            request,
        }
    }

    /// Posts in the game's channel. Failures are logged, never fatal.
    pub(crate) async fn announce(&self, text: &str) {
        let channel = &self.request.channel;
        if let Err(e) = self.services.messenger.send_channel(channel, text).await {
            warn!(%channel, error = %e, "Channel message not delivered");
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone)]
pub struct GameReport {
    /// [`GamePhase::Done`] or [`GamePhase::Cancelled`].
    pub phase: GamePhase,
    /// Everyone seated when the join window closed, in join order.
    pub players: Vec<UserId>,
    pub rounds_played: u32,
    /// Players removed before the end. They receive no payout.
    pub removed: Vec<Removal>,
    /// `None` for a cancelled game.
    pub payout: Option<Payout>,
}

/// One CRINGO! game.
pub struct CringoGame {
    ctx: GameContext,
    phase: GamePhase,
    rng: StdRng,
}

impl CringoGame {
    pub fn new(ctx: GameContext) -> Self {
        Self {
            ctx,
            phase: GamePhase::Joining,
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes cards and calls reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Runs the game to completion.
    ///
    /// `subscription` must be taken before the announcement is posted so that
    /// no join reaction is missed.
    ///
    /// # Errors
    ///
    /// Fails if the announcement cannot be posted or the symbol pools run
    /// dry. Failures to reach individual players never end the game.
    pub async fn run(self, subscription: Subscription) -> GameResult<GameReport> {
        let span = span!(
            Level::INFO,
            "cringo_game",
            channel = %self.ctx.request.channel,
            size = %self.ctx.request.size
        );
        self.play(subscription).instrument(span).await
    }

    async fn play(mut self, mut subscription: Subscription) -> GameResult<GameReport> {
        let ctx = &self.ctx;
        let request = &ctx.request;
        let total = request.size.total_rounds();
        let messenger = &ctx.services.messenger;

        let text = display::announcement(request, &ctx.settings);
        let announcement = messenger.send_channel(&request.channel, &text).await?;
        if let Err(e) = messenger
            .add_reaction(&request.channel, &announcement, JOIN_EMOJI)
            .await
        {
            warn!(error = %e, "Could not add join reaction");
        }
        info!(host = %request.host.id, "Game announced");

        let mut table = JoinCoordinator::new(ctx, &mut self.rng)
            .run(&mut subscription, &announcement)
            .await?;
        let players = table.users();

        if table.is_empty() {
            transition(&mut self.phase, GamePhase::Cancelled, total)?;
            ctx.announce(&display::cancelled()).await;
            return Ok(GameReport {
                phase: self.phase,
                players,
                rounds_played: 0,
                removed: Vec::new(),
                payout: None,
            });
        }
        ctx.announce(&display::roster_closed(&table)).await;

        let mut engine = RoundEngine::new(ctx, &mut self.rng);
        let mut removed = Vec::new();
        let mut rounds_played = 0;
        for number in 1..=total {
            transition(&mut self.phase, GamePhase::Round(number), total)?;
            let summary = engine.play(number, &mut table, &mut subscription).await?;
            removed.extend(summary.removed);
            rounds_played = number;

            if table.is_empty() {
                info!(round = number, "Every player is gone");
                ctx.announce(&display::everyone_left()).await;
                break;
            }
        }

        transition(&mut self.phase, GamePhase::Payout, total)?;
        let payout = settle(ctx, &table).await;
        ctx.announce(&display::results(&payout, &table)).await;
        transition(&mut self.phase, GamePhase::Done, total)?;

        info!(
            rounds = rounds_played,
            finishers = table.len(),
            winner = ?payout.winner,
            "Game finished"
        );
        Ok(GameReport {
            phase: self.phase,
            players,
            rounds_played,
            removed,
            payout: Some(payout),
        })
    }
}

fn transition(phase: &mut GamePhase, next: GamePhase, total: u32) -> GameResult<()> {
    *phase = phase.advance(next, total)?;
    debug!(phase = %phase, "Phase changed");
    Ok(())
}

/// Pays every finisher and records statistics where the card size counts.
async fn settle(ctx: &GameContext, table: &Table) -> Payout {
    let scores = table
        .iter()
        .map(|seat| (seat.user().clone(), seat.session().score()));
    let payout = compute_payouts(scores, ctx.request.home_bonus(&ctx.settings));

    let ledger = &ctx.services.ledger;
    let record_stats = ctx.request.size.records_stats();
    for award in &payout.awards {
        let user = &award.user;
        match ledger.credit(user, award.amount).await {
            Ok(balance) => debug!(%user, amount = award.amount, balance, "Payout credited"),
            Err(e) => error!(%user, amount = award.amount, error = %e, "Payout not credited"),
        }
        if record_stats {
            let won = payout.winner.as_ref() == Some(user);
            if let Err(e) = ledger.record_game_stats(user, award.amount, won).await {
                warn!(%user, error = %e, "Game statistics not recorded");
            }
        }
    }
    payout
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use cringo_core::{
        CardGenerator, CardSize, ChannelId, DeliveryResult, GameError, InboundEvent, Line,
        MessageId, Participant,
    };
    use tokio::time::sleep;

    use super::*;
    use crate::bus::EventBus;
    use crate::memory::{MemoryLedger, MemoryMessenger, StaticModeration};
    use crate::platform::{BoxedMessenger, Messenger};
    use crate::roster::PlayingRoster;
    use crate::round::RemovalReason;

    pub(crate) struct Harness {
        pub ctx: GameContext,
        pub messenger: Arc<MemoryMessenger>,
        pub ledger: Arc<MemoryLedger>,
    }

    pub(crate) fn harness(request: GameRequest) -> Harness {
        let messenger = Arc::new(MemoryMessenger::new());
        harness_with(request, messenger.clone(), messenger)
    }

    /// Like [`harness`], but every private message takes `delay` to go out.
    pub(crate) fn slow_harness(request: GameRequest, delay: Duration) -> Harness {
        let messenger = Arc::new(MemoryMessenger::new());
        let slow = SlowMessenger {
            inner: messenger.clone(),
            delay,
        };
        harness_with(request, Arc::new(slow), messenger)
    }

    fn harness_with(
        request: GameRequest,
        boxed: BoxedMessenger,
        messenger: Arc<MemoryMessenger>,
    ) -> Harness {
        let ledger = Arc::new(MemoryLedger::new());
        let services = GameServices::new(
            boxed,
            ledger.clone(),
            Arc::new(StaticModeration::new()),
            PlayingRoster::new(),
        );
        Harness {
            ctx: GameContext::new(services, GameSettings::default(), request),
            messenger,
            ledger,
        }
    }

    struct SlowMessenger {
        inner: Arc<MemoryMessenger>,
        delay: Duration,
    }

    #[async_trait]
    impl Messenger for SlowMessenger {
        async fn send_private(&self, user: &UserId, content: &str) -> DeliveryResult<MessageId> {
            sleep(self.delay).await;
            self.inner.send_private(user, content).await
        }

        async fn send_channel(
            &self,
            channel: &ChannelId,
            content: &str,
        ) -> DeliveryResult<MessageId> {
            self.inner.send_channel(channel, content).await
        }

        async fn add_reaction(
            &self,
            channel: &ChannelId,
            message: &MessageId,
            emoji: &str,
        ) -> DeliveryResult<()> {
            self.inner.add_reaction(channel, message, emoji).await
        }

        async fn reactions(
            &self,
            channel: &ChannelId,
            message: &MessageId,
            emoji: &str,
        ) -> DeliveryResult<Vec<Participant>> {
            self.inner.reactions(channel, message, emoji).await
        }
    }

    fn player(id: &str) -> Participant {
        Participant::new(id, format!("player-{id}"))
    }

    async fn announcement(messenger: &MemoryMessenger, channel: &str) -> MessageId {
        sleep(Duration::from_secs(1)).await;
        messenger.first_in(&ChannelId::new(channel)).unwrap().id
    }

    fn join(bus: &EventBus, announcement: &MessageId, id: &str) {
        bus.publish(InboundEvent::reaction(
            "table",
            announcement.clone(),
            player(id),
            JOIN_EMOJI,
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_game_pays_finishers() {
        let Harness {
            ctx,
            messenger,
            ledger,
        } = harness(GameRequest::new("table", player("host")));
        let roster = ctx.services.roster.clone();
        let bus = EventBus::new(64);
        let handle = tokio::spawn(CringoGame::new(ctx).with_seed(7).run(bus.subscribe()));

        let id = announcement(&messenger, "table").await;
        for user in ["a", "b", "c"] {
            join(&bus, &id, user);
        }
        // Join window closes at 30s, round 1 is called at 35s.
        sleep(Duration::from_secs(35)).await;
        bus.publish(InboundEvent::direct_message(player("a"), "f9 f9"));

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.phase, GamePhase::Done);
        assert_eq!(report.rounds_played, CardSize::Standard.total_rounds());
        assert_eq!(
            report.players,
            vec![UserId::new("a"), UserId::new("b"), UserId::new("c")]
        );
        assert!(report.removed.is_empty());

        let payout = report.payout.unwrap();
        assert!((payout.nerf - 46.3).abs() < 1e-9);
        assert_eq!(payout.winner, Some(UserId::new("b")));

        let a = ledger.account(&UserId::new("a")).unwrap();
        assert!((a.balance + 3.0 / 46.3).abs() < 1e-9);
        assert_eq!(a.games_played, 1);
        let b = ledger.account(&UserId::new("b")).unwrap();
        assert_eq!((b.balance, b.games_won), (0.0, 1));
        assert_eq!(ledger.account(&UserId::new("c")).unwrap().games_played, 1);

        assert!(roster.is_empty());
        assert!(messenger.private_messages(&UserId::new("a"))[0].contains("You're in!"));
        let channel = messenger.channel_messages(&ChannelId::new("table"));
        assert!(channel.last().unwrap().contains("CRINGO! is over"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_line_is_credited() {
        const SEED: u64 = 21;
        let size = CardSize::Small;

        // Replay the game's draws: three cards in join order, then the calls.
        let mut rng = StdRng::seed_from_u64(SEED);
        let generator = CardGenerator::new(size);
        let _card_a = generator.card(&mut rng).unwrap();
        let card_b = generator.card(&mut rng).unwrap();
        let _card_c = generator.card(&mut rng).unwrap();

        // With one symbol per column left uncalled after the last round, a
        // 2×2 card always has a fully called row, column or diagonal by then.
        let mut called = HashSet::new();
        let mut plan = None;
        for round in 1..=size.total_rounds() {
            let call = generator.call(&mut rng, &called).unwrap();
            called.extend(call);
            plan = Line::all(size.n()).find_map(|line| {
                let positions = line.positions(size.n());
                positions
                    .iter()
                    .all(|p| card_b.symbol_at(*p).is_some_and(|s| called.contains(&s)))
                    .then_some((round, positions))
            });
            if plan.is_some() {
                break;
            }
        }
        let (round, positions) = plan.unwrap();
        let claims: Vec<String> = positions.iter().map(ToString::to_string).collect();

        let Harness {
            ctx,
            messenger,
            ledger,
        } = harness(GameRequest::new("table", player("host")).with_size(size));
        let bus = EventBus::new(64);
        let handle = tokio::spawn(CringoGame::new(ctx).with_seed(SEED).run(bus.subscribe()));

        let id = announcement(&messenger, "table").await;
        for user in ["a", "b", "c"] {
            join(&bus, &id, user);
        }
        // Round k is called at 35s + 30s × (k - 1).
        sleep(Duration::from_secs(35)).await;
        bus.publish(InboundEvent::direct_message(player("a"), "f9 f9"));
        sleep(Duration::from_secs(30) * (round - 1)).await;
        bus.publish(InboundEvent::direct_message(player("b"), claims.join(" ")));

        let report = handle.await.unwrap().unwrap();
        let payout = report.payout.unwrap();
        assert_eq!(payout.winner, Some(UserId::new("b")));

        // Two matches and the line, all at the claiming round's multiplier.
        let multiplier = i64::from(size.total_rounds() + 1 - round);
        let expected = 2 * 10 * multiplier + 100 * multiplier;
        let scores: Vec<i64> = payout.awards.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![-3, expected, 0]);

        let b = ledger.account(&UserId::new("b")).unwrap();
        assert!((b.balance - expected as f64 / 46.3).abs() < 1e-9);
        let a = ledger.account(&UserId::new("a")).unwrap();
        assert!((a.balance + 3.0 / 46.3).abs() < 1e-9);
        // Small cards never count towards statistics.
        assert_eq!(b.games_played, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_join_cancels() {
        let Harness { ctx, messenger, .. } = harness(GameRequest::new("table", player("host")));
        let bus = EventBus::new(8);
        let start = tokio::time::Instant::now();

        let report = CringoGame::new(ctx).run(bus.subscribe()).await.unwrap();

        assert_eq!(report.phase, GamePhase::Cancelled);
        assert!(report.payout.is_none());
        assert!(tokio::time::Instant::now() >= start + Duration::from_secs(30));
        let channel = messenger.channel_messages(&ChannelId::new("table"));
        assert_eq!(channel.len(), 2);
        assert!(channel[1].contains("cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_ends_when_everyone_leaves() {
        let request = GameRequest::new("table", player("host"))
            .with_size(CardSize::Small)
            .with_venue("home");
        let Harness {
            mut ctx,
            messenger,
            ledger,
        } = harness(request);
        ctx.settings.home_venue = Some("home".into());
        let bus = EventBus::new(16);
        let handle = tokio::spawn(CringoGame::new(ctx).with_seed(3).run(bus.subscribe()));

        let id = announcement(&messenger, "table").await;
        join(&bus, &id, "solo");
        sleep(Duration::from_secs(35)).await;
        bus.publish(InboundEvent::direct_message(player("solo"), "LEAVE a1"));

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.phase, GamePhase::Done);
        assert_eq!(report.rounds_played, 1);
        assert_eq!(report.removed[0].reason, RemovalReason::Left);
        assert!(report.payout.unwrap().awards.is_empty());
        assert!(ledger.account(&UserId::new("solo")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpostable_announcement_fails() {
        let Harness { ctx, messenger, .. } = harness(GameRequest::new("table", player("host")));
        messenger.close_channel("table");
        let bus = EventBus::new(8);

        let err = CringoGame::new(ctx).run(bus.subscribe()).await.unwrap_err();
        assert!(matches!(err, GameError::Delivery(_)));
    }
}
