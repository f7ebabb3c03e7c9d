//! Console Table Demo
//!
//! Hosts one CRINGO! game through the real runtime, with an in-memory
//! platform that prints every channel post and private message to the
//! terminal. Simulated players join by reaction, read their card and the
//! calls from their private messages, and answer with coordinates.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-table -- --players 4 --size 4 --round-secs 5
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cringo::core::JOIN_EMOJI;
use cringo::framework::memory::{MemoryLedger, MemoryMessenger, StaticModeration};
use cringo::prelude::*;
use cringo::runtime::config::{LogLevel, validate_config};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

const CHANNEL: &str = "console";
const STARTING_BALANCE: f64 = 100.0;

#[derive(Parser, Debug)]
#[command(name = "console-table")]
#[command(about = "Play a CRINGO! game against simulated players")]
struct Args {
    /// Number of simulated players
    #[arg(short, long, default_value = "4")]
    players: usize,

    /// Card size: 2, 4, 6, small, standard or large
    #[arg(short, long, default_value = "4")]
    size: String,

    /// Seed for the simulated players' behaviour
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Seconds the join window stays open
    #[arg(long, default_value = "2")]
    join_secs: u64,

    /// Seconds players have to answer each round
    #[arg(long, default_value = "4")]
    round_secs: u64,

    /// Chance that a player notices a called symbol on their card
    #[arg(long, default_value = "0.8")]
    skill: f64,

    /// Log runtime internals at debug level
    #[arg(short, long)]
    verbose: bool,
}

// ============================================================================
// Console platform
// ============================================================================

/// Prints everything it sends and forwards private messages to the
/// simulated players.
struct ConsoleMessenger {
    inner: MemoryMessenger,
    names: HashMap<UserId, String>,
    inboxes: HashMap<UserId, mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send_private(&self, user: &UserId, content: &str) -> DeliveryResult<MessageId> {
        let id = self.inner.send_private(user, content).await?;
        let name = self.names.get(user).map_or(user.as_str(), String::as_str);
        println!("── DM to {name} ──\n{content}\n");
        if let Some(inbox) = self.inboxes.get(user) {
            let _ = inbox.send(content.to_string());
        }
        Ok(id)
    }

    async fn send_channel(&self, channel: &ChannelId, content: &str) -> DeliveryResult<MessageId> {
        let id = self.inner.send_channel(channel, content).await?;
        println!("══ #{channel} ══\n{content}\n");
        Ok(id)
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

// ============================================================================
// Simulated players
// ============================================================================

/// A player who only knows what their private messages tell them.
struct SimulatedPlayer {
    participant: Participant,
    card: Vec<Vec<String>>,
    called: HashSet<String>,
    claimed: HashSet<(usize, usize)>,
    rng: StdRng,
    skill: f64,
    round_time: Duration,
}

impl SimulatedPlayer {
    async fn play(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<String>,
        outbox: mpsc::Sender<InboundEvent>,
    ) {
        while let Some(message) = inbox.recv().await {
            if message.starts_with("You're in!") {
                self.card = parse_card(&message);
                debug!(player = %self.participant.id, rows = self.card.len(), "Card read");
            } else if message.starts_with("**Round") {
                self.called.extend(parse_call(&message));
                let Some(reply) = self.answer() else {
                    continue;
                };
                let upper = self.round_time.mul_f64(0.8).max(Duration::from_millis(100));
                let delay = self.rng.gen_range(Duration::from_millis(50)..upper);
                sleep(delay).await;
                let event = InboundEvent::direct_message(self.participant.clone(), reply);
                if outbox.send(event).await.is_err() {
                    return;
                }
            } else if message.contains("have been removed") {
                return;
            }
        }
    }

    /// Claims every called cell the player happens to notice.
    fn answer(&mut self) -> Option<String> {
        let mut tokens = Vec::new();
        for (r, row) in self.card.iter().enumerate() {
            for (c, symbol) in row.iter().enumerate() {
                if self.claimed.contains(&(c, r)) || !self.called.contains(symbol) {
                    continue;
                }
                if self.rng.gen_bool(self.skill) {
                    self.claimed.insert((c, r));
                    tokens.push(format!("{}{}", CardSize::column_label(c + 1), r + 1));
                }
            }
        }
        // The occasional careless claim.
        if self.rng.gen_bool(0.1) && !self.card.is_empty() {
            let n = self.card.len();
            let (c, r) = (self.rng.gen_range(0..n), self.rng.gen_range(0..n));
            if !self.claimed.contains(&(c, r)) {
                tokens.push(format!("{}{}", CardSize::column_label(c + 1), r + 1));
            }
        }
        (!tokens.is_empty()).then(|| tokens.join(" "))
    }
}

/// The card is the block between the first two blank lines of the card DM.
fn parse_card(message: &str) -> Vec<Vec<String>> {
    message
        .split("\n\n")
        .nth(1)
        .unwrap_or_default()
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}

/// Symbols follow `): ` on the first line of a round call.
fn parse_call(message: &str) -> Vec<String> {
    message
        .lines()
        .next()
        .and_then(|line| line.split_once("): "))
        .map(|(_, symbols)| symbols.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if !(1..=20).contains(&args.players) {
        bail!("--players must be between 1 and 20");
    }
    if !(0.0..=1.0).contains(&args.skill) {
        bail!("--skill must be between 0 and 1");
    }

    let mut config = CringoConfig::default();
    config.logging.level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    config.game.join_window_secs = args.join_secs;
    config.game.scoreboard_pause_secs = 1;
    config.game.round_secs = args.round_secs;
    validate_config(&config).context("invalid demo timings")?;

    let players: Vec<Participant> = (1..=args.players)
        .map(|i| Participant::new(format!("p{i}"), format!("Player {i}")))
        .collect();

    let mut ledger = MemoryLedger::new();
    let mut names = HashMap::new();
    let mut inboxes = HashMap::new();
    let mut receivers = Vec::new();
    for player in &players {
        ledger = ledger.with_balance(player.id.clone(), STARTING_BALANCE);
        names.insert(player.id.clone(), player.name.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        inboxes.insert(player.id.clone(), tx);
        receivers.push(rx);
    }
    let ledger = Arc::new(ledger);
    let messenger = Arc::new(ConsoleMessenger {
        inner: MemoryMessenger::new(),
        names,
        inboxes,
    });

    let services = GameServices::new(
        messenger.clone(),
        ledger.clone(),
        Arc::new(StaticModeration::new()),
        PlayingRoster::new(),
    );
    let round_time = Duration::from_secs(config.game.round_secs);
    let runtime = Arc::new(CringoRuntime::from_config(config, services));

    let (outbox, mut inbound) = mpsc::channel::<InboundEvent>(256);
    let router = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move {
            while let Some(event) = inbound.recv().await {
                if let Err(e) = runtime.handle_event(event).await {
                    info!(error = %e, "Event rejected");
                }
            }
        })
    };

    for (i, (player, inbox)) in players.iter().zip(receivers).enumerate() {
        let simulated = SimulatedPlayer {
            participant: player.clone(),
            card: Vec::new(),
            called: HashSet::new(),
            claimed: HashSet::new(),
            rng: StdRng::seed_from_u64(args.seed.wrapping_add(i as u64)),
            skill: args.skill,
            round_time,
        };
        tokio::spawn(simulated.play(inbox, outbox.clone()));
    }

    let host = Participant::new("host", "Host");
    let command = format!("!cringo {} any", args.size);
    let start = InboundEvent::channel_message(CHANNEL, None, host, command);
    let game = runtime
        .handle_event(start)
        .await?
        .context("the start command was not recognised")?;

    sleep(Duration::from_millis(200)).await;
    let announcement = messenger
        .inner
        .first_in(&ChannelId::new(CHANNEL))
        .context("the game was not announced")?;
    for player in &players {
        messenger
            .inner
            .react(CHANNEL, announcement.id.clone(), JOIN_EMOJI, player.clone());
        let join =
            InboundEvent::reaction(CHANNEL, announcement.id.clone(), player.clone(), JOIN_EMOJI);
        outbox.send(join).await?;
    }

    let report = game.await??;
    drop(outbox);
    router.abort();

    println!("Rounds played: {}", report.rounds_played);
    for player in &players {
        let balance = ledger.balance(&player.id).await?;
        println!("{}: balance {balance:.2}", player.name);
    }
    Ok(())
}
