//! The host runtime: routes inbound events and runs games.
//!
//! A platform adapter feeds [`InboundEvent`]s into [`CringoRuntime::run`]
//! (or calls [`CringoRuntime::handle_event`] itself). Every event goes onto
//! the event bus, where running games pick up reactions and submissions.
//! Channel messages are also checked for the start command; each accepted
//! command spawns one [`CringoGame`] on its own task.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cringo_runtime::CringoRuntime;
//!
//! let runtime = CringoRuntime::builder()
//!     .config_file("cringo.toml")
//!     .build(services)?;
//!
//! runtime.run(inbound_events).await?;
//! ```

use std::future::Future;

use cringo_core::{ChannelId, GameResult, InboundEvent};
use cringo_framework::{
    CringoGame, EventBus, GameContext, GameReport, GameRequest, GameServices, GameSettings,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::command::{StartCommand, parse_command};
use crate::config::{ConfigLoader, CringoConfig};
use crate::error::{CommandError, RuntimeError, RuntimeResult};
use crate::logging;
use crate::registry::{GameRegistry, RegistryStats};

/// A game running on its own task.
pub type GameHandle = JoinHandle<GameResult<GameReport>>;

const BUSY_NOTICE: &str = "A CRINGO! game is already running here, wait for it to finish.";

/// Hosts CRINGO! games for one bot account.
pub struct CringoRuntime {
    config: CringoConfig,
    settings: GameSettings,
    services: GameServices,
    bus: EventBus,
    registry: GameRegistry,
}

impl CringoRuntime {
    /// Creates a runtime without touching the global logger.
    pub fn new(config: CringoConfig, services: GameServices) -> Self {
        let settings = config.game_settings();
        let bus = EventBus::new(config.game.event_buffer);
        let registry = GameRegistry::new(services.roster.clone());
        Self {
            config,
            settings,
            services,
            bus,
            registry,
        }
    }

    /// Creates a runtime and initializes logging from `config.logging`.
    pub fn from_config(config: CringoConfig, services: GameServices) -> Self {
        logging::init_from_config(&config.logging);
        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            command = %format!("{}{}", config.game.command_prefix, config.game.command_name),
            "Runtime initialized from configuration"
        );
        Self::new(config, services)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &CringoConfig {
        &self.config
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Publishes `event` to running games, then starts a game if it is a
    /// start command.
    ///
    /// Returns the spawned game, if any. Direct messages and messages from
    /// bots never start a game. A malformed command is answered with a usage
    /// hint in the channel.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ChannelBusy`] if the channel already hosts a game.
    pub async fn handle_event(&self, event: InboundEvent) -> RuntimeResult<Option<GameHandle>> {
        let request = self.route(&event);
        let receivers = self.bus.publish(event);
        debug!(receivers, "Event published");

        match request {
            None => Ok(None),
            Some((channel, Err(e))) => {
                debug!(%channel, error = %e, "Malformed command");
                let game = &self.config.game;
                self.reply(&channel, &e.usage_hint(&game.command_prefix, &game.command_name))
                    .await;
                Ok(None)
            }
            Some((_, Ok(request))) => self.start_game(request).await.map(Some),
        }
    }

    /// Turns a channel command into a game request.
    fn route(
        &self,
        event: &InboundEvent,
    ) -> Option<(ChannelId, Result<GameRequest, CommandError>)> {
        let InboundEvent::Message {
            channel,
            venue,
            author,
            content,
            direct: false,
            ..
        } = event
        else {
            return None;
        };
        if author.is_bot {
            return None;
        }

        let parsed = parse_command(content, &self.config.game)?;
        let request = parsed.map(|StartCommand { size, min_balance }| {
            let request = GameRequest::new(channel.clone(), author.clone())
                .with_size(size)
                .with_min_balance(min_balance);
            match venue {
                Some(venue) => request.with_venue(venue.clone()),
                None => request,
            }
        });
        Some((channel.clone(), request))
    }

    /// Claims the request's channel and spawns the game.
    ///
    /// The game subscribes to the bus before this returns, so no event
    /// published afterwards is missed. The channel is released when the game
    /// task ends.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ChannelBusy`] if the channel already hosts a game.
    pub async fn start_game(&self, request: GameRequest) -> RuntimeResult<GameHandle> {
        let Some(lease) = self
            .registry
            .try_claim(&request.channel, request.size, &request.host.id)
        else {
            info!(channel = %request.channel, host = %request.host.id, "Channel busy");
            self.reply(&request.channel, BUSY_NOTICE).await;
            return Err(RuntimeError::ChannelBusy {
                channel: request.channel,
            });
        };

        let subscription = self.bus.subscribe();
        let ctx = GameContext::new(self.services.clone(), self.settings.clone(), request);
        let game = CringoGame::new(ctx);
        info!(
            channel = %lease.channel(),
            size = %game.context().request.size,
            min_balance = ?game.context().request.min_balance,
            "Starting game"
        );

        Ok(tokio::spawn(async move {
            let _lease = lease;
            let result = game.run(subscription).await;
            match &result {
                Ok(report) => debug!(phase = %report.phase, "Game task finished"),
                Err(e) => error!(error = %e, "Game aborted"),
            }
            result
        }))
    }

    /// Drives [`handle_event`](Self::handle_event) until the inbound stream
    /// closes or a shutdown signal arrives.
    pub async fn run(&self, inbound: mpsc::Receiver<InboundEvent>) -> RuntimeResult<()> {
        info!("CRINGO! runtime is now running. Press Ctrl+C to stop.");
        self.run_until(inbound, wait_for_shutdown()).await
    }

    /// Like [`run`](Self::run), stopping when `shutdown` completes.
    pub async fn run_until<F>(
        &self,
        mut inbound: mpsc::Receiver<InboundEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                event = inbound.recv() => {
                    let Some(event) = event else {
                        info!("Inbound event stream closed");
                        break;
                    };
                    if let Err(e) = self.handle_event(event).await {
                        debug!(error = %e, "Command not started");
                    }
                }
                () = &mut shutdown => break,
            }
        }

        info!(stats = %self.stats(), "Runtime stopped");
        Ok(())
    }

    async fn reply(&self, channel: &ChannelId, text: &str) {
        if let Err(e) = self.services.messenger.send_channel(channel, text).await {
            warn!(%channel, error = %e, "Reply not delivered");
        }
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c() => {}
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration, then builds a [`CringoRuntime`] around the host's
/// collaborators.
///
/// ```rust,ignore
/// let runtime = CringoRuntime::builder()
///     .profile("production")
///     .build(services)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: CringoConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and initializes logging.
    pub fn build(self, services: GameServices) -> RuntimeResult<CringoRuntime> {
        let config = self.config_loader.load()?;
        Ok(CringoRuntime::from_config(config, services))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cringo_core::{CardSize, GamePhase, JOIN_EMOJI, MinBalance, Participant, UserId};
    use cringo_framework::PlayingRoster;
    use cringo_framework::memory::{MemoryLedger, MemoryMessenger, StaticModeration};
    use tokio::time::sleep;

    use super::*;

    struct Host {
        runtime: CringoRuntime,
        messenger: Arc<MemoryMessenger>,
    }

    fn host() -> Host {
        let messenger = Arc::new(MemoryMessenger::new());
        let services = GameServices::new(
            messenger.clone(),
            Arc::new(MemoryLedger::new()),
            Arc::new(StaticModeration::new()),
            PlayingRoster::new(),
        );
        Host {
            runtime: CringoRuntime::new(CringoConfig::default(), services),
            messenger,
        }
    }

    fn command(channel: &str, author: Participant, content: &str) -> InboundEvent {
        InboundEvent::channel_message(channel, None, author, content)
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_starts_game() {
        let host = host();
        let channel = ChannelId::new("general");
        let alice = Participant::new("alice", "Alice");

        let handle = host
            .runtime
            .handle_event(command("general", alice.clone(), "!cringo 2 any"))
            .await
            .unwrap()
            .unwrap();
        let record = host.runtime.registry().get(&channel).unwrap();
        assert_eq!(record.size, CardSize::Small);
        assert_eq!(record.host, alice.id);

        sleep(Duration::from_secs(1)).await;
        let announcement = host.messenger.first_in(&channel).unwrap();
        assert!(announcement.content.contains("anyone can play"));

        let join = InboundEvent::reaction("general", announcement.id, alice.clone(), JOIN_EMOJI);
        assert!(host.runtime.handle_event(join).await.unwrap().is_none());

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.phase, GamePhase::Done);
        assert_eq!(report.players, vec![UserId::new("alice")]);
        assert_eq!(report.rounds_played, CardSize::Small.total_rounds());
        assert!(!host.runtime.registry().is_active(&channel));
        assert_eq!(host.runtime.stats(), RegistryStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_channel() {
        let host = host();
        let channel = ChannelId::new("general");
        let alice = Participant::new("alice", "Alice");
        let bob = Participant::new("bob", "Bob");

        let first = host
            .runtime
            .handle_event(command("general", alice, "!cringo"))
            .await
            .unwrap()
            .unwrap();

        let second = host
            .runtime
            .handle_event(command("general", bob, "!cringo 6"))
            .await;
        assert!(matches!(second, Err(RuntimeError::ChannelBusy { .. })));
        assert!(
            host.messenger
                .channel_messages(&channel)
                .iter()
                .any(|m| m == BUSY_NOTICE)
        );
        assert_eq!(host.runtime.stats().games, 1);

        let report = first.await.unwrap().unwrap();
        assert_eq!(report.phase, GamePhase::Cancelled);
        assert!(!host.runtime.registry().is_active(&channel));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_messages() {
        let host = host();
        let bot = Participant::bot("other-bot", "Other");
        let alice = Participant::new("alice", "Alice");

        let from_bot = command("general", bot, "!cringo");
        assert!(host.runtime.handle_event(from_bot).await.unwrap().is_none());

        let direct = InboundEvent::direct_message(alice.clone(), "!cringo");
        assert!(host.runtime.handle_event(direct).await.unwrap().is_none());

        let chatter = command("general", alice, "anyone up for cringo?");
        assert!(host.runtime.handle_event(chatter).await.unwrap().is_none());

        assert!(host.messenger.sent().is_empty());
        assert_eq!(host.runtime.stats().games, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_command_gets_usage() {
        let host = host();
        let channel = ChannelId::new("general");
        let event = command("general", Participant::new("alice", "Alice"), "!cringo 5");

        assert!(host.runtime.handle_event(event).await.unwrap().is_none());

        let replies = host.messenger.channel_messages(&channel);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("unknown card size `5`"));
        assert!(replies[0].contains("!cringo [size] [min_balance]"));
        assert!(!host.runtime.registry().is_active(&channel));
    }

    #[tokio::test(start_paused = true)]
    async fn test_venue_and_default_balance_reach_the_game() {
        let host = host();
        let event = InboundEvent::channel_message(
            "lobby",
            Some("home".into()),
            Participant::new("alice", "Alice"),
            "!cringo",
        );
        let handle = host.runtime.handle_event(event).await.unwrap().unwrap();
        sleep(Duration::from_secs(1)).await;

        let announcement = host.messenger.first_in(&ChannelId::new("lobby")).unwrap();
        let expected = MinBalance::Amount(0.0);
        assert_eq!(host.runtime.config().game.min_balance(), expected);
        assert!(announcement.content.contains("minimum balance 0.00"));

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.phase, GamePhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stream_closes() {
        let host = host();
        let (tx, rx) = mpsc::channel(8);
        tx.send(command("general", Participant::new("alice", "Alice"), "!cringo 4"))
            .await
            .unwrap();
        drop(tx);

        host.runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();
        assert_eq!(host.runtime.stats().games, 1);
    }
}
