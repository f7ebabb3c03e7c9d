//! Opaque platform identifiers.
//!
//! Chat platforms disagree on what an identifier looks like (snowflakes,
//! numeric QQ ids, UUIDs), so every id is carried as a string newtype and
//! only ever compared for equality.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw platform identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identity of a platform user.
    UserId
);

define_id!(
    /// A text channel, or the direct-message channel with one user.
    ChannelId
);

define_id!(
    /// A message posted by the bot or by a user.
    MessageId
);

define_id!(
    /// The server/guild a channel belongs to. Used for the home-venue bonus.
    VenueId
);

/// The user behind an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Platform identity.
    pub id: UserId,
    /// Display name used in channel messages.
    pub name: String,
    /// Bot accounts never join games or issue commands.
    #[serde(default)]
    pub is_bot: bool,
}

impl Participant {
    /// Creates a human participant.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot: false,
        }
    }

    /// Creates a bot participant.
    pub fn bot(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            ..Self::new(id, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = UserId::new("1234");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234\"");
        let back: UserId = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_bot_participant() {
        let bot = Participant::bot("1", "cringo");
        assert!(bot.is_bot);
        assert!(!Participant::new("2", "alice").is_bot);
    }
}
