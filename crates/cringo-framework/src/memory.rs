//! In-memory collaborators.
//!
//! Used by the test suites and the console demo. They keep everything they
//! are told in process memory and expose it for inspection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use cringo_core::{
    ChannelId, DeliveryError, DeliveryResult, LedgerError, LedgerResult, MessageId, Participant,
    UserId,
};
use parking_lot::Mutex;

use crate::platform::{Ledger, Messenger, Moderation};

// ============================================================================
// Messenger
// ============================================================================

/// Where a message went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    User(UserId),
    Channel(ChannelId),
}

/// A message recorded by [`MemoryMessenger`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub id: MessageId,
    pub to: Recipient,
    pub content: String,
}

#[derive(Debug)]
struct StoredReaction {
    channel: ChannelId,
    message: MessageId,
    emoji: String,
    user: Participant,
}

#[derive(Debug, Default)]
struct MessengerState {
    next_id: u64,
    sent: Vec<SentMessage>,
    /// Remaining private deliveries per user before they become unreachable.
    delivery_budget: HashMap<UserId, usize>,
    closed_channels: HashSet<ChannelId>,
    reactions: Vec<StoredReaction>,
}

impl MessengerState {
    fn record(&mut self, to: Recipient, content: &str) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(format!("msg-{}", self.next_id));
        self.sent.push(SentMessage {
            id: id.clone(),
            to,
            content: content.to_string(),
        });
        id
    }
}

/// A [`Messenger`] that records everything it sends.
#[derive(Debug, Default)]
pub struct MemoryMessenger {
    state: Mutex<MessengerState>,
}

impl MemoryMessenger {
    /// Identity used for reactions the bot adds itself.
    pub const BOT_ID: &'static str = "cringo-bot";

    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every private message to `user` fail.
    pub fn set_unreachable(&self, user: impl Into<UserId>) {
        self.set_unreachable_after(user, 0);
    }

    /// Lets `deliveries` more private messages reach `user`, then fails.
    pub fn set_unreachable_after(&self, user: impl Into<UserId>, deliveries: usize) {
        self.state
            .lock()
            .delivery_budget
            .insert(user.into(), deliveries);
    }

    /// Makes every message to `channel` fail.
    pub fn close_channel(&self, channel: impl Into<ChannelId>) {
        self.state.lock().closed_channels.insert(channel.into());
    }

    /// Records a reaction as if a user had added it on the platform.
    ///
    /// Nothing is published; this is what [`Messenger::reactions`] returns.
    pub fn react(
        &self,
        channel: impl Into<ChannelId>,
        message: impl Into<MessageId>,
        emoji: &str,
        user: Participant,
    ) {
        self.state.lock().reactions.push(StoredReaction {
            channel: channel.into(),
            message: message.into(),
            emoji: emoji.to_string(),
            user,
        });
    }

    /// Every message sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.lock().sent.clone()
    }

    /// Private messages delivered to `user`, in order.
    pub fn private_messages(&self, user: &UserId) -> Vec<String> {
        self.filtered(|to| matches!(to, Recipient::User(u) if u == user))
    }

    /// Messages posted in `channel`, in order.
    pub fn channel_messages(&self, channel: &ChannelId) -> Vec<String> {
        self.filtered(|to| matches!(to, Recipient::Channel(c) if c == channel))
    }

    /// First message posted in `channel`: a game's announcement.
    pub fn first_in(&self, channel: &ChannelId) -> Option<SentMessage> {
        self.state
            .lock()
            .sent
            .iter()
            .find(|m| matches!(&m.to, Recipient::Channel(c) if c == channel))
            .cloned()
    }

    fn filtered(&self, keep: impl Fn(&Recipient) -> bool) -> Vec<String> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|m| keep(&m.to))
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn send_private(&self, user: &UserId, content: &str) -> DeliveryResult<MessageId> {
        let mut state = self.state.lock();
        if let Some(budget) = state.delivery_budget.get_mut(user) {
            if *budget == 0 {
                return Err(DeliveryError::Unreachable { user: user.clone() });
            }
            *budget -= 1;
        }
        Ok(state.record(Recipient::User(user.clone()), content))
    }

    async fn send_channel(&self, channel: &ChannelId, content: &str) -> DeliveryResult<MessageId> {
        let mut state = self.state.lock();
        if state.closed_channels.contains(channel) {
            return Err(DeliveryError::ChannelUnavailable {
                channel: channel.clone(),
            });
        }
        Ok(state.record(Recipient::Channel(channel.clone()), content))
    }

    async fn add_reaction(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> DeliveryResult<()> {
        self.react(
            channel.clone(),
            message.clone(),
            emoji,
            Participant::bot(Self::BOT_ID, "CRINGO!"),
        );
        Ok(())
    }

    async fn reactions(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> DeliveryResult<Vec<Participant>> {
        Ok(self
            .state
            .lock()
            .reactions
            .iter()
            .filter(|r| &r.channel == channel && &r.message == message && r.emoji == emoji)
            .map(|r| r.user.clone())
            .collect())
    }
}

// ============================================================================
// Ledger
// ============================================================================

/// Balance and statistics of one user in a [`MemoryLedger`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountRecord {
    pub balance: f64,
    pub games_played: u32,
    pub games_won: u32,
    pub total_awarded: f64,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<UserId, AccountRecord>,
    offline: bool,
}

/// A [`Ledger`] kept in a map. Unknown users hold a zero balance.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set_balance`](Self::set_balance).
    pub fn with_balance(self, user: impl Into<UserId>, balance: f64) -> Self {
        self.set_balance(user, balance);
        self
    }

    pub fn set_balance(&self, user: impl Into<UserId>, balance: f64) {
        self.state
            .lock()
            .accounts
            .entry(user.into())
            .or_default()
            .balance = balance;
    }

    /// Makes every ledger call fail with a storage error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    pub fn account(&self, user: &UserId) -> Option<AccountRecord> {
        self.state.lock().accounts.get(user).cloned()
    }

    fn online(state: &LedgerState) -> LedgerResult<()> {
        if state.offline {
            Err(LedgerError::Storage("ledger offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn balance(&self, user: &UserId) -> LedgerResult<f64> {
        let state = self.state.lock();
        Self::online(&state)?;
        Ok(state.accounts.get(user).map_or(0.0, |account| account.balance))
    }

    async fn credit(&self, user: &UserId, amount: f64) -> LedgerResult<f64> {
        let mut state = self.state.lock();
        Self::online(&state)?;
        let account = state.accounts.entry(user.clone()).or_default();
        account.balance += amount;
        Ok(account.balance)
    }

    async fn record_game_stats(&self, user: &UserId, awarded: f64, won: bool) -> LedgerResult<()> {
        let mut state = self.state.lock();
        Self::online(&state)?;
        let account = state.accounts.entry(user.clone()).or_default();
        account.games_played += 1;
        account.total_awarded += awarded;
        if won {
            account.games_won += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Moderation
// ============================================================================

/// A fixed ban list.
#[derive(Debug, Clone, Default)]
pub struct StaticModeration {
    banned: HashSet<UserId>,
}

impl StaticModeration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_banned(mut self, user: impl Into<UserId>) -> Self {
        self.banned.insert(user.into());
        self
    }
}

#[async_trait]
impl Moderation for StaticModeration {
    async fn is_banned(&self, user: &UserId) -> bool {
        self.banned.contains(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messenger_delivery_budget() {
        let messenger = MemoryMessenger::new();
        let user = UserId::new("u");
        messenger.set_unreachable_after("u", 1);

        assert!(messenger.send_private(&user, "first").await.is_ok());
        let err = messenger.send_private(&user, "second").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Unreachable { .. }));
        assert_eq!(messenger.private_messages(&user), vec!["first"]);
    }

    #[tokio::test]
    async fn test_messenger_reactions_include_bot() {
        let messenger = MemoryMessenger::new();
        let channel = ChannelId::new("c");
        let id = messenger.send_channel(&channel, "hello").await.unwrap();
        messenger.add_reaction(&channel, &id, "🎲").await.unwrap();
        messenger.react("c", id.clone(), "🎲", Participant::new("1", "one"));
        messenger.react("c", id.clone(), "👍", Participant::new("2", "two"));

        let reactors = messenger.reactions(&channel, &id, "🎲").await.unwrap();
        assert_eq!(reactors.len(), 2);
        assert!(reactors[0].is_bot);
        assert_eq!(messenger.first_in(&channel).unwrap().id, id);
    }

    #[tokio::test]
    async fn test_ledger_accounts() {
        let ledger = MemoryLedger::new().with_balance("a", 5.0);
        let a = UserId::new("a");

        assert_eq!(ledger.balance(&UserId::new("nobody")).await.unwrap(), 0.0);
        assert_eq!(ledger.credit(&a, -7.5).await.unwrap(), -2.5);
        ledger.record_game_stats(&a, -7.5, false).await.unwrap();

        let account = ledger.account(&a).unwrap();
        assert_eq!(account.games_played, 1);
        assert_eq!(account.games_won, 0);

        ledger.set_offline(true);
        assert!(ledger.balance(&a).await.is_err());
    }
}
