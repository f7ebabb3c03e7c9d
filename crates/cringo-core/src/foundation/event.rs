//! Inbound interaction events.
//!
//! Platform adapters translate whatever their gateway delivers into
//! [`InboundEvent`]s. Only two kinds matter to a game: reactions (joining)
//! and messages (commands in a channel, submissions in direct messages).
//!
//! Every event is stamped with the monotonic instant it entered the process.
//! Deadlines are decided against that stamp rather than against the moment a
//! waiting task happens to observe the event, so late network delivery cannot
//! sneak a submission into a closed round.

use tokio::time::Instant;

use super::ids::{ChannelId, MessageId, Participant, UserId, VenueId};

/// Which kind of inbound event a wait accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A reaction added to a message.
    Reaction,
    /// A text message, in a channel or in direct messages.
    Message,
}

/// An interaction delivered by the platform.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A user reacted to a message.
    ReactionAdded {
        channel: ChannelId,
        message: MessageId,
        user: Participant,
        emoji: String,
        received_at: Instant,
    },
    /// A user posted a message.
    Message {
        channel: ChannelId,
        /// Venue of the channel, absent for direct messages.
        venue: Option<VenueId>,
        author: Participant,
        content: String,
        /// `true` when the message was sent privately to the bot.
        direct: bool,
        received_at: Instant,
    },
}

impl InboundEvent {
    /// Builds a reaction event stamped with the current instant.
    pub fn reaction(
        channel: impl Into<ChannelId>,
        message: impl Into<MessageId>,
        user: Participant,
        emoji: impl Into<String>,
    ) -> Self {
        Self::ReactionAdded {
            channel: channel.into(),
            message: message.into(),
            user,
            emoji: emoji.into(),
            received_at: Instant::now(),
        }
    }

    /// Builds a channel message event stamped with the current instant.
    pub fn channel_message(
        channel: impl Into<ChannelId>,
        venue: Option<VenueId>,
        author: Participant,
        content: impl Into<String>,
    ) -> Self {
        Self::Message {
            channel: channel.into(),
            venue,
            author,
            content: content.into(),
            direct: false,
            received_at: Instant::now(),
        }
    }

    /// Builds a direct message event stamped with the current instant.
    ///
    /// The channel of a direct message is the private channel with the author.
    pub fn direct_message(author: Participant, content: impl Into<String>) -> Self {
        Self::Message {
            channel: ChannelId::new(format!("dm:{}", author.id)),
            venue: None,
            author,
            content: content.into(),
            direct: true,
            received_at: Instant::now(),
        }
    }

    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ReactionAdded { .. } => EventKind::Reaction,
            Self::Message { .. } => EventKind::Message,
        }
    }

    /// Returns who performed the interaction.
    pub fn participant(&self) -> &Participant {
        match self {
            Self::ReactionAdded { user, .. } => user,
            Self::Message { author, .. } => author,
        }
    }

    /// Shortcut for the identity of [`participant`](Self::participant).
    pub fn user_id(&self) -> &UserId {
        &self.participant().id
    }

    /// Returns the channel the event happened in.
    pub fn channel(&self) -> &ChannelId {
        match self {
            Self::ReactionAdded { channel, .. } | Self::Message { channel, .. } => channel,
        }
    }

    /// Returns the arrival stamp.
    pub fn received_at(&self) -> Instant {
        match self {
            Self::ReactionAdded { received_at, .. } | Self::Message { received_at, .. } => {
                *received_at
            }
        }
    }

    /// Returns `true` if this is `emoji` added to `message`.
    pub fn is_reaction_to(&self, message: &MessageId, emoji: &str) -> bool {
        matches!(
            self,
            Self::ReactionAdded { message: m, emoji: e, .. } if m == message && e == emoji
        )
    }

    /// Returns the text of a direct message, `None` for anything else.
    pub fn direct_text(&self) -> Option<&str> {
        match self {
            Self::Message {
                content,
                direct: true,
                ..
            } => Some(content),
            _ => None,
        }
    }
}
