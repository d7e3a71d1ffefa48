use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

/// Longest message body accepted from the composer, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

pub type UserId = String;
pub type RoomId = String;
pub type MessageId = String;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Away,
    Busy,
    Offline,
}

impl UserStatus {
    pub const ALL: [UserStatus; 4] = [Self::Online, Self::Away, Self::Busy, Self::Offline];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status {s}"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub avatar: String,
    pub is_online: bool,
    pub status: UserStatus,
    #[serde(with = "crate::timestamp")]
    pub last_seen: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    General,
    Random,
    Help,
    Announcements,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub member_count: u32,
    #[serde(with = "crate::timestamp")]
    pub last_activity: OffsetDateTime,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

/// Emoji keyed tally. `count` always equals `user_ids.len()` and a reaction
/// with no users is removed rather than kept at zero.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub emoji: String,
    pub count: u32,
    pub user_ids: Vec<UserId>,
}

impl Reaction {
    pub fn new(emoji: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            emoji: emoji.into(),
            count: 1,
            user_ids: vec![user_id.into()],
        }
    }

    pub fn includes(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    System,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub user_id: UserId,
    /// Author name at send time; not updated if the user is renamed.
    pub username: String,
    pub content: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Plain text message with no reactions.
    pub fn text(
        id: impl Into<MessageId>,
        room_id: impl Into<RoomId>,
        author: &User,
        content: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            user_id: author.id.clone(),
            username: author.username.clone(),
            content: content.into(),
            timestamp,
            reactions: Vec::new(),
            kind: MessageKind::Text,
        }
    }

    pub fn reaction(&self, emoji: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji == emoji)
    }

    /// Restore the reaction invariants on data from outside the store: counts
    /// follow membership, duplicate members and empty reactions are dropped.
    pub fn normalize_reactions(&mut self) {
        for reaction in &mut self.reactions {
            let mut seen = Vec::with_capacity(reaction.user_ids.len());
            reaction.user_ids.retain(|id| {
                if seen.contains(id) {
                    false
                } else {
                    seen.push(id.clone());
                    true
                }
            });
            reaction.count = reaction.user_ids.len() as u32;
        }
        self.reactions.retain(|r| r.count > 0);
    }
}

/// Aggregate chat state. Collections are shared behind `Arc` and copied on
/// write, so a state value is never mutated once published.
///
/// `current_user` is a detached copy: changing its status leaves the
/// matching entry in `users` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    pub current_user: User,
    pub users: Arc<Vec<User>>,
    pub rooms: Arc<Vec<ChatRoom>>,
    pub messages: Arc<Vec<ChatMessage>>,
    pub current_room_id: RoomId,
    pub is_loading: bool,
}

impl ChatState {
    pub fn room(&self, room_id: &str) -> Option<&ChatRoom> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    pub fn current_room(&self) -> Option<&ChatRoom> {
        self.room(&self.current_room_id)
    }

    pub fn message(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }
}

/// Fields to overlay on a state; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialChatState {
    pub current_user: Option<User>,
    pub users: Option<Vec<User>>,
    pub rooms: Option<Vec<ChatRoom>>,
    pub messages: Option<Vec<ChatMessage>>,
    pub current_room_id: Option<RoomId>,
    pub is_loading: Option<bool>,
}

impl PartialChatState {
    pub fn messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: Some(messages),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Busy".parse::<UserStatus>(), Ok(UserStatus::Busy));
        assert_eq!(" away ".parse::<UserStatus>(), Ok(UserStatus::Away));
        assert!("dnd".parse::<UserStatus>().is_err());
    }

    #[test]
    fn normalize_fixes_counts_and_drops_empty() {
        let mut msg: ChatMessage = serde_json::from_str(
            r#"{"id":"m","roomId":"general","userId":"u","username":"U","content":"c",
                "timestamp":"2024-03-01T10:00:00.000Z","type":"text",
                "reactions":[{"emoji":"👍","count":5,"userIds":["a","a","b"]},
                             {"emoji":"🎉","count":2,"userIds":[]}]}"#,
        )
        .unwrap();
        msg.normalize_reactions();
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].count, 2);
        assert_eq!(msg.reactions[0].user_ids, vec!["a", "b"]);
    }

    #[test]
    fn message_json_uses_camel_case_and_type_tag() {
        let author = User {
            id: "user-1".into(),
            username: "You".into(),
            avatar: String::new(),
            is_online: true,
            status: UserStatus::Online,
            last_seen: OffsetDateTime::UNIX_EPOCH,
        };
        let msg = ChatMessage::text("m1", "general", &author, "hi", OffsetDateTime::UNIX_EPOCH);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["roomId"], "general");
        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["type"], "text");
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00.000Z");
    }
}
